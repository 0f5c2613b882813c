use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::dashboards::requests::StudentTeamsQuery;
use crate::models::users::entities::UserRole;
use crate::services::DashboardService;

// 懒加载的全局 DashboardService 实例
static DASHBOARD_SERVICE: Lazy<DashboardService> = Lazy::new(DashboardService::new_lazy);

pub async fn dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.dashboard(&req).await
}

pub async fn instructor_index(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.instructor_index(&req).await
}

pub async fn instructor_teams(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.instructor_teams(&req).await
}

pub async fn instructor_results(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.instructor_results(&req).await
}

pub async fn student_index(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.student_index(&req).await
}

pub async fn student_teams(
    req: HttpRequest,
    query: web::Query<StudentTeamsQuery>,
) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE
        .student_teams(&req, query.into_inner())
        .await
}

pub async fn student_evaluations(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.student_evaluations(&req).await
}

pub async fn student_feedback(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.student_feedback(&req).await
}

// 配置路由
pub fn configure_dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/dashboard")
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireJWT)
            // 按角色分派
            .route("", web::get().to(dashboard))
            .service(
                web::scope("/instructor")
                    .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles()))
                    .route("", web::get().to(instructor_index))
                    .route("/teams", web::get().to(instructor_teams))
                    .route("/results", web::get().to(instructor_results)),
            )
            .service(
                web::scope("/student")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route("", web::get().to(student_index))
                    .route("/teams", web::get().to(student_teams))
                    .route("/evaluations", web::get().to(student_evaluations))
                    .route("/feedback", web::get().to(student_feedback)),
            ),
    );
}
