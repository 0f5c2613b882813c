use super::entities::UserRole;
use serde::Deserialize;

// 用户创建请求（用于存储层，password 为哈希后的值）
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub student_number: Option<String>,
}
