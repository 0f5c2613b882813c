use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DashboardService;
use crate::models::dashboards::entities::InstructorTeamsView;
use crate::models::evaluations::{
    entities::{EvaluationScope, EvaluationStatus},
    responses::EvaluationListResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, storage_error_response};

pub async fn index(service: &DashboardService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.instructor_dashboard(user.id).await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            dashboard,
            "Dashboard retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}

// 所带团队，以及所授课程中尚未分组的学生
pub async fn teams(service: &DashboardService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let teams = match storage.list_teams_by_instructor(user.id).await {
        Ok(teams) => teams,
        Err(e) => return Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    };
    let available_students = match storage.list_available_students_by_instructor(user.id).await {
        Ok(students) => students,
        Err(e) => return Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        InstructorTeamsView {
            teams,
            available_students,
        },
        "Teams retrieved successfully",
    )))
}

// 已完成的互评结果
pub async fn results(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage
        .list_evaluations(
            EvaluationScope::Instructor(user.id),
            Some(EvaluationStatus::Completed),
        )
        .await
    {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            EvaluationListResponse { items },
            "Results retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}
