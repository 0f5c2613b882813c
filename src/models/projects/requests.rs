use serde::Deserialize;
use ts_rs::TS;

// 创建项目请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "project.ts")]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: chrono::DateTime<chrono::Utc>,
}
