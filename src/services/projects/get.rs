use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ProjectService;
use crate::models::ApiResponse;
use crate::services::{access, current_user};

pub async fn get_project(
    service: &ProjectService,
    request: &HttpRequest,
    project_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match access::project_for_user(&storage, &user, project_id).await {
        Ok((project, _)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            project,
            "Project retrieved successfully",
        ))),
        Err(resp) => Ok(resp),
    }
}
