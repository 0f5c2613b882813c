//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_ratings_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum RatingsError {
            $($variant(String),)*
        }

        impl RatingsError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(RatingsError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(RatingsError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(RatingsError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl RatingsError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        RatingsError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_ratings_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    Validation("E004", "Validation Error"),
    NotFound("E005", "Resource Not Found"),
    Serialization("E006", "Serialization Error"),
    Authorization("E007", "Authorization Error"),
    CapacityExceeded("E008", "Team Capacity Exceeded"),
    AlreadyAssigned("E009", "Student Already Assigned"),
    NotAMember("E010", "Student Not A Team Member"),
    Conflict("E011", "Resource Conflict"),
}

impl RatingsError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for RatingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for RatingsError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for RatingsError {
    fn from(err: sea_orm::DbErr) -> Self {
        RatingsError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for RatingsError {
    fn from(err: serde_json::Error) -> Self {
        RatingsError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RatingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(RatingsError::database_config("test").code(), "E001");
        assert_eq!(RatingsError::validation("test").code(), "E004");
        assert_eq!(RatingsError::capacity_exceeded("test").code(), "E008");
        assert_eq!(RatingsError::not_a_member("test").code(), "E010");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            RatingsError::already_assigned("test").error_type(),
            "Student Already Assigned"
        );
        assert_eq!(
            RatingsError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_format_simple() {
        let err = RatingsError::capacity_exceeded("Team A is full");
        let formatted = err.format_simple();
        assert!(formatted.contains("Team Capacity Exceeded"));
        assert!(formatted.contains("Team A is full"));
    }
}
