use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{TeamService, resolve_capacity, validate_team_name};
use crate::config::AppConfig;
use crate::models::teams::{entities::TeamWithMembers, requests::CreateTeamRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, current_user, storage_error_response};

pub async fn create_team(
    service: &TeamService,
    request: &HttpRequest,
    project_id: i64,
    mut team_data: CreateTeamRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    team_data.name = team_data.name.trim().to_string();
    if let Err(msg) = validate_team_name(&team_data.name) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::TeamCreationFailed, msg)));
    }
    let capacity = match resolve_capacity(team_data.capacity, &AppConfig::get().team) {
        Ok(capacity) => capacity,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::TeamCreationFailed, msg)));
        }
    };

    // 团队教师即项目所属课程的教师
    let (project, course) = match access::owned_project(&storage, &user, project_id).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    match storage
        .create_team(project.id, course.instructor_id, capacity, team_data)
        .await
    {
        Ok(team) => {
            info!(
                "Team {} ({}) created in project {} with capacity {}",
                team.id, team.name, project.id, team.capacity
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                TeamWithMembers {
                    team,
                    members: Vec::new(),
                },
                "Team created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(e, ErrorCode::TeamCreationFailed)),
    }
}
