pub mod auth;
pub mod common;
pub mod courses;
pub mod dashboards;
pub mod evaluations;
pub mod projects;
pub mod teams;
pub mod users;

pub use common::ApiResponse;

use serde::{Deserialize, Serialize};

// 程序启动时间
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

// 统一业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证与用户
    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserEmailInvalid = 2010,
    UserEmailAlreadyExists = 2011,
    UserPasswordInvalid = 2012,
    UserNameInvalid = 2013,

    // 课程
    CourseNotFound = 3004,
    CourseCodeAlreadyExists = 3009,
    CoursePermissionDenied = 3003,
    CourseEnrollFailed = 3010,

    // 项目
    ProjectNotFound = 4004,
    ProjectCreationFailed = 4010,

    // 团队
    TeamNotFound = 5004,
    TeamCreationFailed = 5010,
    TeamUpdateFailed = 5011,
    TeamCapacityExceeded = 5020,
    TeamAlreadyAssigned = 5021,
    TeamNotAMember = 5022,
    TeamMemberAddFailed = 5023,
    TeamMemberRemoveFailed = 5024,

    // 互评
    EvaluationNotFound = 6004,
    EvaluationValidationFailed = 6010,
    EvaluationSubmitFailed = 6011,
    EvaluationAlreadyCompleted = 6012,

    // 提醒
    ReminderFailed = 7010,
}
