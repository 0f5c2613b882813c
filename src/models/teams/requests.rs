use serde::Deserialize;
use ts_rs::TS;

// 创建团队请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "team.ts")]
pub struct CreateTeamRequest {
    pub name: String,
    pub description: Option<String>,
    /// 缺省时使用 team.default_capacity
    pub capacity: Option<i32>,
}

// 更新团队请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "team.ts")]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
}

// 添加成员请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "team.ts")]
pub struct AddMemberRequest {
    pub user_id: i64,
}
