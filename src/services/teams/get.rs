use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TeamService;
use crate::models::teams::responses::TeamListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, current_user, storage_error_response};

pub async fn list_teams(
    service: &TeamService,
    request: &HttpRequest,
    project_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let (project, _) = match access::project_for_user(&storage, &user, project_id).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    match storage.list_teams_by_project(project.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            TeamListResponse { items },
            "Teams retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}

pub async fn get_team(
    service: &TeamService,
    request: &HttpRequest,
    team_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = access::team_for_user(&storage, &user, team_id).await {
        return Ok(resp);
    }

    match storage.get_team_with_members(team_id).await {
        Ok(Some(team)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            team,
            "Team retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TeamNotFound,
            "Team not found",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}
