use serde::Serialize;
use ts_rs::TS;

use crate::models::dashboards::entities::ProjectTeams;

/// 学生团队视图响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct StudentTeamsResponse {
    pub items: Vec<ProjectTeams>,
}
