use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::EvaluationService;
use crate::models::evaluations::responses::EvaluationListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, current_user, storage_error_response};

pub async fn generate_for_team(
    service: &EvaluationService,
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

    match storage.generate_team_evaluations(team.id).await {
        Ok(items) => {
            info!(
                "Generated {} pending evaluations for team {}",
                items.len(),
                team.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                EvaluationListResponse { items },
                "Evaluations generated successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}
