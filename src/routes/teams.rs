use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::teams::requests::{AddMemberRequest, UpdateTeamRequest};
use crate::models::users::entities::UserRole;
use crate::services::{EvaluationService, TeamService};
use crate::utils::{SafeTeamIdI64, SafeUserIdI64};

// 懒加载的全局服务实例
static TEAM_SERVICE: Lazy<TeamService> = Lazy::new(TeamService::new_lazy);
static EVALUATION_SERVICE: Lazy<EvaluationService> = Lazy::new(EvaluationService::new_lazy);

pub async fn get_team(req: HttpRequest, team_id: SafeTeamIdI64) -> ActixResult<HttpResponse> {
    TEAM_SERVICE.get_team(&req, team_id.0).await
}

pub async fn update_team(
    req: HttpRequest,
    team_id: SafeTeamIdI64,
    update_data: web::Json<UpdateTeamRequest>,
) -> ActixResult<HttpResponse> {
    TEAM_SERVICE
        .update_team(&req, team_id.0, update_data.into_inner())
        .await
}

pub async fn delete_team(req: HttpRequest, team_id: SafeTeamIdI64) -> ActixResult<HttpResponse> {
    TEAM_SERVICE.delete_team(&req, team_id.0).await
}

pub async fn list_members(req: HttpRequest, team_id: SafeTeamIdI64) -> ActixResult<HttpResponse> {
    TEAM_SERVICE.list_members(&req, team_id.0).await
}

pub async fn add_member(
    req: HttpRequest,
    team_id: SafeTeamIdI64,
    member_data: web::Json<AddMemberRequest>,
) -> ActixResult<HttpResponse> {
    TEAM_SERVICE
        .add_member(&req, team_id.0, member_data.into_inner())
        .await
}

pub async fn remove_member(
    req: HttpRequest,
    team_id: SafeTeamIdI64,
    user_id: SafeUserIdI64,
) -> ActixResult<HttpResponse> {
    TEAM_SERVICE.remove_member(&req, team_id.0, user_id.0).await
}

pub async fn list_available_students(
    req: HttpRequest,
    team_id: SafeTeamIdI64,
) -> ActixResult<HttpResponse> {
    TEAM_SERVICE.list_available_students(&req, team_id.0).await
}

pub async fn generate_evaluations(
    req: HttpRequest,
    team_id: SafeTeamIdI64,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.generate_for_team(&req, team_id.0).await
}

// 配置路由
pub fn configure_teams_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/teams")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{team_id}")
                    .route(web::get().to(get_team))
                    .route(
                        web::put()
                            .to(update_team)
                            .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_team)
                            .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                    ),
            )
            .service(
                web::resource("/{team_id}/members")
                    .route(web::get().to(list_members))
                    .route(
                        web::post()
                            .to(add_member)
                            .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                    ),
            )
            .service(
                web::resource("/{team_id}/members/{user_id}").route(
                    web::delete()
                        .to(remove_member)
                        .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                ),
            )
            .service(
                web::resource("/{team_id}/available-students").route(
                    web::get()
                        .to(list_available_students)
                        .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                ),
            )
            .service(
                web::resource("/{team_id}/evaluations").route(
                    web::post()
                        .to(generate_evaluations)
                        .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                ),
            ),
    );
}
