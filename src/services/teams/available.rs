use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TeamService;
use crate::models::users::responses::UserListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, current_user, storage_error_response};

pub async fn list_available_students(
    service: &TeamService,
    request: &HttpRequest,
    team_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let team = match access::owned_team(&storage, &user, team_id).await {
        Ok(team) => team,
        Err(resp) => return Ok(resp),
    };
    let (_, course) = match access::owned_project(&storage, &user, team.project_id).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    match storage.list_available_students(course.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserListResponse { items },
            "Available students retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}
