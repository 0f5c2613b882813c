use serde::Deserialize;
use ts_rs::TS;

// 创建课程请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CreateCourseRequest {
    pub title: String,
    pub code: String,
}

// 学生选课请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct EnrollStudentsRequest {
    pub user_ids: Vec<i64>,
}
