use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::EvaluationService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, storage_error_response};

pub async fn get_evaluation(
    service: &EvaluationService,
    request: &HttpRequest,
    evaluation_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let evaluation = match storage.get_evaluation_by_id(evaluation_id).await {
        Ok(Some(evaluation)) => evaluation,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::EvaluationNotFound,
                "Evaluation not found",
            )));
        }
        Err(e) => return Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    };

    let team_instructor_id = match storage.get_team_by_id(evaluation.team_id).await {
        Ok(Some(team)) => team.instructor_id,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::TeamNotFound,
                "Team not found",
            )));
        }
        Err(e) => return Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    };

    if !evaluation.is_visible_to(user.id, team_instructor_id) {
        info!("User {} denied access to evaluation {}", user.id, evaluation.id);
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You do not have access to this evaluation",
        )));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        evaluation,
        "Evaluation retrieved successfully",
    )))
}
