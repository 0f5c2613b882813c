use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ProjectService;
use crate::models::projects::responses::ProjectListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, current_user, storage_error_response};

pub async fn list_projects(
    service: &ProjectService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let course = match access::course_for_user(&storage, &user, course_id).await {
        Ok(course) => course,
        Err(resp) => return Ok(resp),
    };

    match storage.list_projects_by_course(course.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ProjectListResponse { items },
            "Projects retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}
