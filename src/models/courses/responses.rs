use serde::Serialize;
use ts_rs::TS;

use crate::models::courses::entities::Course;

/// 课程列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseListResponse {
    pub items: Vec<Course>,
}

/// 选课结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct EnrollStudentsResponse {
    pub enrolled: i64,
}
