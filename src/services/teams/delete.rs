use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::TeamService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, current_user, invalidate_cached_users, storage_error_response};

pub async fn delete_team(
    service: &TeamService,
    request: &HttpRequest,
    team_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = access::owned_team(&storage, &user, team_id).await {
        return Ok(resp);
    }

    let member_ids: Vec<i64> = match storage.list_team_members(team_id).await {
        Ok(members) => members.iter().map(|m| m.id).collect(),
        Err(e) => return Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    };

    match storage.delete_team(team_id).await {
        Ok(true) => {
            invalidate_cached_users(request, member_ids).await;
            info!("Team {} deleted by instructor {}", team_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Team deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TeamNotFound,
            "Team not found",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}
