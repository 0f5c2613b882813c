use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{TeamService, resolve_capacity, validate_team_name};
use crate::config::AppConfig;
use crate::models::teams::requests::UpdateTeamRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, current_user, storage_error_response};

pub async fn update_team(
    service: &TeamService,
    request: &HttpRequest,
    team_id: i64,
    mut update_data: UpdateTeamRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Some(name) = update_data.name.as_mut() {
        *name = name.trim().to_string();
        if let Err(msg) = validate_team_name(name) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::TeamUpdateFailed, msg)));
        }
    }
    // 不能低于当前成员数由存储层在事务内检查
    if update_data.capacity.is_some()
        && let Err(msg) = resolve_capacity(update_data.capacity, &AppConfig::get().team)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::TeamUpdateFailed, msg)));
    }

    if let Err(resp) = access::owned_team(&storage, &user, team_id).await {
        return Ok(resp);
    }

    match storage.update_team(team_id, update_data).await {
        Ok(Some(team)) => {
            info!("Team {} updated by instructor {}", team.id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(team, "Team updated successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TeamNotFound,
            "Team not found",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::TeamUpdateFailed)),
    }
}
