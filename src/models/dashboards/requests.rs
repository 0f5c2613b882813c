use serde::Deserialize;
use ts_rs::TS;

// 学生团队视图的查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct StudentTeamsQuery {
    pub course_id: Option<i64>,
}
