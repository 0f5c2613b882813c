pub mod access;
pub mod auth;
pub mod courses;
pub mod dashboards;
pub mod evaluations;
pub mod projects;
pub mod reminders;
pub mod teams;

pub use auth::AuthService;
pub use courses::CourseService;
pub use dashboards::DashboardService;
pub use evaluations::EvaluationService;
pub use projects::ProjectService;
pub use reminders::{ReminderNotifier, ReminderService, TracingReminderNotifier};
pub use teams::TeamService;

use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::error;

use crate::cache::{ObjectCache, user_cache_key};
use crate::errors::RatingsError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, users::entities::User};
use crate::storage::Storage;

/// 从 app data 中取出存储，服务未注入存储时使用
pub(crate) fn storage_from_request(request: &HttpRequest) -> Arc<dyn Storage> {
    request
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone()
}

/// 团队归属变化后，让这些用户的认证缓存失效
pub(crate) async fn invalidate_cached_users(
    request: &HttpRequest,
    user_ids: impl IntoIterator<Item = i64>,
) {
    if let Some(cache) = request.app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>() {
        for user_id in user_ids {
            cache.remove(&user_cache_key(user_id)).await;
        }
    }
}

/// 当前登录用户，缺失时返回 401 响应
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user",
        ))
    })
}

/// 存储层错误到 HTTP 响应的映射
///
/// 业务规则错误直接把消息返回给调用方；其余按 500 处理并记录日志，
/// 使用 `failure_code` 作为错误码。
pub(crate) fn storage_error_response(err: RatingsError, failure_code: ErrorCode) -> HttpResponse {
    match err {
        RatingsError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::NotFound, msg))
        }
        RatingsError::NotAMember(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::TeamNotAMember, msg))
        }
        RatingsError::Validation(msg) => {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
        }
        RatingsError::Authorization(msg) => {
            HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, msg))
        }
        RatingsError::CapacityExceeded(msg) => HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::TeamCapacityExceeded, msg),
        ),
        RatingsError::AlreadyAssigned(msg) => HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::TeamAlreadyAssigned, msg),
        ),
        RatingsError::Conflict(msg) => {
            HttpResponse::Conflict().json(ApiResponse::error_empty(ErrorCode::Conflict, msg))
        }
        other => {
            error!("{}", other.format_simple());
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                failure_code,
                "Internal server error",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_domain_errors_map_to_client_statuses() {
        let cases = [
            (RatingsError::not_found("x"), StatusCode::NOT_FOUND),
            (RatingsError::not_a_member("x"), StatusCode::NOT_FOUND),
            (RatingsError::validation("x"), StatusCode::BAD_REQUEST),
            (RatingsError::authorization("x"), StatusCode::FORBIDDEN),
            (RatingsError::capacity_exceeded("x"), StatusCode::CONFLICT),
            (RatingsError::already_assigned("x"), StatusCode::CONFLICT),
            (RatingsError::conflict("x"), StatusCode::CONFLICT),
            (
                RatingsError::database_operation("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let response = storage_error_response(err, ErrorCode::InternalServerError);
            assert_eq!(response.status(), status);
        }
    }
}
