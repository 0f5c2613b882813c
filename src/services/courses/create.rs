use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::models::courses::requests::CreateCourseRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, storage_error_response};
use crate::utils::validate::{validate_course_code, validate_title};

pub async fn create_course(
    service: &CourseService,
    request: &HttpRequest,
    mut course_data: CreateCourseRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    course_data.title = course_data.title.trim().to_string();
    course_data.code = course_data.code.trim().to_uppercase();

    if let Err(msg) = validate_title(&course_data.title) {
        return Ok(
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)),
        );
    }
    if let Err(msg) = validate_course_code(&course_data.code) {
        return Ok(
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)),
        );
    }

    // 课程代码唯一
    match storage.get_course_by_code(&course_data.code).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::CourseCodeAlreadyExists,
                "Course code already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }

    match storage.create_course(user.id, course_data).await {
        Ok(course) => {
            info!("Course {} created by instructor {}", course.code, user.id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(course, "Course created successfully")))
        }
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}
