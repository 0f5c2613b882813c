use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::User;

// 团队实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "team.ts")]
pub struct Team {
    pub id: i64,
    pub project_id: i64,
    pub instructor_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub capacity: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 带成员列表的团队
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "team.ts")]
pub struct TeamWithMembers {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<User>,
}
