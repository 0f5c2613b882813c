use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::evaluations::requests::SubmitEvaluationRequest;
use crate::models::users::entities::UserRole;
use crate::services::EvaluationService;
use crate::utils::SafeEvaluationIdI64;

// 懒加载的全局 EvaluationService 实例
static EVALUATION_SERVICE: Lazy<EvaluationService> = Lazy::new(EvaluationService::new_lazy);

pub async fn get_evaluation(
    req: HttpRequest,
    evaluation_id: SafeEvaluationIdI64,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .get_evaluation(&req, evaluation_id.0)
        .await
}

pub async fn submit_evaluation(
    req: HttpRequest,
    evaluation_id: SafeEvaluationIdI64,
    submit_data: web::Json<SubmitEvaluationRequest>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .submit_evaluation(&req, evaluation_id.0, submit_data.into_inner())
        .await
}

// 配置路由
pub fn configure_evaluations_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/evaluations")
            .wrap(middlewares::RequireJWT)
            .service(web::resource("/{evaluation_id}").route(web::get().to(get_evaluation)))
            .service(
                web::resource("/{evaluation_id}/submit").route(
                    web::post()
                        .to(submit_evaluation)
                        .wrap(middlewares::RateLimit::evaluation_submit())
                        .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                ),
            ),
    );
}
