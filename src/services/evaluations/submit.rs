use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::EvaluationService;
use crate::config::AppConfig;
use crate::errors::RatingsError;
use crate::models::evaluations::requests::SubmitEvaluationRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, storage_error_response};

pub async fn submit_evaluation(
    service: &EvaluationService,
    request: &HttpRequest,
    evaluation_id: i64,
    submit_data: SubmitEvaluationRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let config = &AppConfig::get().evaluation;

    let (ratings, comment) = match submit_data.validate(
        config.min_rating,
        config.max_rating,
        config.max_comment_length,
    ) {
        Ok(validated) => validated,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::EvaluationValidationFailed,
                msg,
            )));
        }
    };

    match storage
        .submit_evaluation(evaluation_id, user.id, ratings, comment)
        .await
    {
        Ok(evaluation) => {
            info!("Evaluation {} submitted by {}", evaluation.id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                evaluation,
                "Evaluation submitted successfully",
            )))
        }
        // 已提交过的评价
        Err(RatingsError::Validation(msg)) => Ok(HttpResponse::BadRequest().json(
            ApiResponse::error_empty(ErrorCode::EvaluationAlreadyCompleted, msg),
        )),
        Err(e) => Ok(storage_error_response(e, ErrorCode::EvaluationSubmitFailed)),
    }
}
