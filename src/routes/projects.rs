use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::teams::requests::CreateTeamRequest;
use crate::models::users::entities::UserRole;
use crate::services::{ProjectService, ReminderService, TeamService};
use crate::utils::SafeProjectIdI64;

// 懒加载的全局服务实例
static PROJECT_SERVICE: Lazy<ProjectService> = Lazy::new(ProjectService::new_lazy);
static TEAM_SERVICE: Lazy<TeamService> = Lazy::new(TeamService::new_lazy);
static REMINDER_SERVICE: Lazy<ReminderService> = Lazy::new(ReminderService::new_lazy);

pub async fn get_project(
    req: HttpRequest,
    project_id: SafeProjectIdI64,
) -> ActixResult<HttpResponse> {
    PROJECT_SERVICE.get_project(&req, project_id.0).await
}

pub async fn delete_project(
    req: HttpRequest,
    project_id: SafeProjectIdI64,
) -> ActixResult<HttpResponse> {
    PROJECT_SERVICE.delete_project(&req, project_id.0).await
}

pub async fn list_teams(
    req: HttpRequest,
    project_id: SafeProjectIdI64,
) -> ActixResult<HttpResponse> {
    TEAM_SERVICE.list_teams(&req, project_id.0).await
}

pub async fn create_team(
    req: HttpRequest,
    project_id: SafeProjectIdI64,
    team_data: web::Json<CreateTeamRequest>,
) -> ActixResult<HttpResponse> {
    TEAM_SERVICE
        .create_team(&req, project_id.0, team_data.into_inner())
        .await
}

pub async fn send_reminders(
    req: HttpRequest,
    project_id: SafeProjectIdI64,
) -> ActixResult<HttpResponse> {
    REMINDER_SERVICE
        .send_project_reminders(&req, project_id.0)
        .await
}

// 配置路由
pub fn configure_projects_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/projects")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{project_id}")
                    .route(web::get().to(get_project))
                    .route(
                        web::delete()
                            .to(delete_project)
                            .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                    ),
            )
            .service(
                web::resource("/{project_id}/teams")
                    .route(web::get().to(list_teams))
                    .route(
                        web::post()
                            .to(create_team)
                            .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                    ),
            )
            .service(
                web::resource("/{project_id}/reminders").route(
                    web::post()
                        .to(send_reminders)
                        .wrap(middlewares::RateLimit::reminder())
                        .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                ),
            ),
    );
}
