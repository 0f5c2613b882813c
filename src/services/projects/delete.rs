use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ProjectService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, current_user, invalidate_cached_users, storage_error_response};

pub async fn delete_project(
    service: &ProjectService,
    request: &HttpRequest,
    project_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let (project, _) = match access::owned_project(&storage, &user, project_id).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    // 删除后成员的 team_id 被清空，先记下需要失效的缓存
    let member_ids: Vec<i64> = match storage.list_teams_by_project(project.id).await {
        Ok(teams) => teams
            .iter()
            .flat_map(|t| t.members.iter().map(|m| m.id))
            .collect(),
        Err(e) => return Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    };

    match storage.delete_project(project.id).await {
        Ok(true) => {
            invalidate_cached_users(request, member_ids).await;
            info!("Project {} deleted by instructor {}", project.id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Project deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ProjectNotFound,
            "Project not found",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}
