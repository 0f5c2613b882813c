use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ProjectService;
use crate::models::projects::requests::CreateProjectRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, current_user, storage_error_response};
use crate::utils::validate::validate_title;

pub async fn create_project(
    service: &ProjectService,
    request: &HttpRequest,
    course_id: i64,
    mut project_data: CreateProjectRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    project_data.title = project_data.title.trim().to_string();
    if let Err(msg) = validate_title(&project_data.title) {
        return Ok(
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)),
        );
    }
    project_data.description = project_data
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let course = match access::owned_course(&storage, &user, course_id).await {
        Ok(course) => course,
        Err(resp) => return Ok(resp),
    };

    match storage.create_project(course.id, project_data).await {
        Ok(project) => {
            info!(
                "Project {} created in course {} by instructor {}",
                project.id, course.id, user.id
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(project, "Project created successfully")))
        }
        Err(e) => Ok(storage_error_response(e, ErrorCode::ProjectCreationFailed)),
    }
}
