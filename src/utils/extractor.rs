//! 路径参数提取器
//!
//! 路径中的 ID 解析失败时直接返回统一格式的 400 响应，而不是 actix 默认的纯文本错误。

use actix_web::{HttpRequest, HttpResponse, error::InternalError};

use crate::models::{ApiResponse, ErrorCode};

/// 定义按名称读取路径参数并解析为正整数 ID 的提取器
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _payload: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                futures_util::future::ready(
                    $crate::utils::extractor::parse_path_id(req, $param).map($name),
                )
            }
        }
    };
}

define_safe_i64_extractor!(SafeCourseIdI64, "course_id");
define_safe_i64_extractor!(SafeProjectIdI64, "project_id");
define_safe_i64_extractor!(SafeTeamIdI64, "team_id");
define_safe_i64_extractor!(SafeUserIdI64, "user_id");
define_safe_i64_extractor!(SafeEvaluationIdI64, "evaluation_id");

/// 读取并校验路径中的 ID
pub fn parse_path_id(req: &HttpRequest, param: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(param).unwrap_or_default();
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(bad_path_param(param, raw)),
    }
}

fn bad_path_param(param: &str, raw: &str) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("Invalid path parameter {param}: '{raw}'"),
    ));
    InternalError::from_response(format!("invalid {param}"), response).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test::TestRequest};

    #[test]
    fn test_parse_path_id_accepts_positive_ids() {
        let req = TestRequest::default()
            .param("team_id", "42")
            .to_http_request();
        assert_eq!(parse_path_id(&req, "team_id").unwrap(), 42);
    }

    #[test]
    fn test_parse_path_id_rejects_garbage() {
        for raw in ["abc", "0", "-3", ""] {
            let req = TestRequest::default()
                .param("team_id", raw)
                .to_http_request();
            let err = parse_path_id(&req, "team_id").unwrap_err();
            assert_eq!(err.as_response_error().status_code(), StatusCode::BAD_REQUEST);
        }
    }
}
