use serde::Serialize;
use ts_rs::TS;

use crate::models::projects::entities::Project;

/// 项目列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "project.ts")]
pub struct ProjectListResponse {
    pub items: Vec<Project>,
}

/// 提醒发送结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "project.ts")]
pub struct ReminderResponse {
    pub students_notified: i64,
    pub pending_evaluations: i64,
}
