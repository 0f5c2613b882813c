use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::models::courses::{requests::EnrollStudentsRequest, responses::EnrollStudentsResponse};
use crate::models::users::responses::UserListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, current_user, storage_error_response};

pub async fn enroll_students(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
    enroll_data: EnrollStudentsRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if enroll_data.user_ids.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "user_ids must not be empty",
        )));
    }

    let course = match access::owned_course(&storage, &user, course_id).await {
        Ok(course) => course,
        Err(resp) => return Ok(resp),
    };

    match storage.enroll_students(course.id, &enroll_data.user_ids).await {
        Ok(enrolled) => {
            info!(
                "Instructor {} enrolled {} of {} requested users into course {}",
                user.id,
                enrolled,
                enroll_data.user_ids.len(),
                course.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                EnrollStudentsResponse {
                    enrolled: enrolled as i64,
                },
                "Students enrolled successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(e, ErrorCode::CourseEnrollFailed)),
    }
}

pub async fn list_students(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let course = match access::owned_course(&storage, &user, course_id).await {
        Ok(course) => course,
        Err(resp) => return Ok(resp),
    };

    match storage.list_course_students(course.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserListResponse { items },
            "Students retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}
