use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::courses::responses::CourseListResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, storage_error_response};

pub async fn list_courses(
    service: &CourseService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let result = match user.role {
        UserRole::Instructor => storage.list_courses_by_instructor(user.id).await,
        UserRole::Student => storage.list_courses_by_student(user.id).await,
    };

    match result {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CourseListResponse { items },
            "Courses retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}
