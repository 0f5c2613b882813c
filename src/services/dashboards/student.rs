use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DashboardService;
use crate::models::dashboards::{
    entities::ProjectTeams, requests::StudentTeamsQuery, responses::StudentTeamsResponse,
};
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

    match storage.student_dashboard(user.id).await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            dashboard,
            "Dashboard retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}

// 所选课程的团队，按项目分组
pub async fn teams(
    service: &DashboardService,
    request: &HttpRequest,
    query: StudentTeamsQuery,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let courses = match storage.list_courses_by_student(user.id).await {
        Ok(courses) => courses,
        Err(e) => return Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    };

    let mut items = Vec::new();
    for course in courses
        .into_iter()
        .filter(|c| query.course_id.is_none_or(|id| id == c.id))
    {
        let projects = match storage.list_projects_by_course(course.id).await {
            Ok(projects) => projects,
            Err(e) => return Ok(storage_error_response(e, ErrorCode::InternalServerError)),
        };
        for project in projects {
            match storage.list_teams_by_project(project.id).await {
                Ok(teams) => items.push(ProjectTeams { project, teams }),
                Err(e) => return Ok(storage_error_response(e, ErrorCode::InternalServerError)),
            }
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentTeamsResponse { items },
        "Teams retrieved successfully",
    )))
}

// 待完成的互评
pub async fn evaluations(
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
            EvaluationScope::Evaluator(user.id),
            Some(EvaluationStatus::Pending),
        )
        .await
    {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            EvaluationListResponse { items },
            "Pending evaluations retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}

// 收到的反馈
pub async fn feedback(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.student_feedback(user.id).await {
        Ok(feedback) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            feedback,
            "Feedback retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}
