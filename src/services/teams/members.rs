//! 团队成员管理
//!
//! 容量与“每个学生最多属于一个团队”的约束由存储层在事务内保证，
//! 这里只负责权限、选课校验以及成员变化后的缓存失效。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::TeamService;
use crate::errors::RatingsError;
use crate::models::teams::{requests::AddMemberRequest, responses::TeamMembersResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, current_user, invalidate_cached_users, storage_error_response};

pub async fn list_members(
    service: &TeamService,
    request: &HttpRequest,
    team_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let team = match access::team_for_user(&storage, &user, team_id).await {
        Ok(team) => team,
        Err(resp) => return Ok(resp),
    };

    match storage.list_team_members(team.id).await {
        Ok(members) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            TeamMembersResponse { team, members },
            "Team members retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}

pub async fn add_member(
    service: &TeamService,
    request: &HttpRequest,
    team_id: i64,
    member_data: AddMemberRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let student_id = member_data.user_id;

    let team = match access::owned_team(&storage, &user, team_id).await {
        Ok(team) => team,
        Err(resp) => return Ok(resp),
    };

    // 只能加入已选该课程的学生
    let (_, course) = match access::owned_project(&storage, &user, team.project_id).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };
    match storage.is_enrolled(course.id, student_id).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::TeamMemberAddFailed,
                "Student is not enrolled in this course",
            )));
        }
        Err(e) => return Ok(storage_error_response(e, ErrorCode::TeamMemberAddFailed)),
    }

    match storage.add_student_to_team(team.id, student_id).await {
        Ok(members) => {
            invalidate_cached_users(request, [student_id]).await;
            info!("Student {} added to team {}", student_id, team.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                TeamMembersResponse { team, members },
                "Student added to team",
            )))
        }
        Err(e @ (RatingsError::CapacityExceeded(_) | RatingsError::AlreadyAssigned(_))) => {
            warn!(
                "Rejected adding student {} to team {}: {}",
                student_id,
                team.id,
                e.message()
            );
            Ok(storage_error_response(add_rejection(e), ErrorCode::TeamMemberAddFailed))
        }
        Err(e) => Ok(storage_error_response(e, ErrorCode::TeamMemberAddFailed)),
    }
}

/// 加入团队被拒绝时，对外消息统一以 "Failed to add team member." 开头
fn add_rejection(err: RatingsError) -> RatingsError {
    match err {
        RatingsError::CapacityExceeded(msg) => {
            RatingsError::capacity_exceeded(format!("Failed to add team member. {msg}"))
        }
        RatingsError::AlreadyAssigned(msg) => {
            RatingsError::already_assigned(format!("Failed to add team member. {msg}"))
        }
        other => other,
    }
}

pub async fn remove_member(
    service: &TeamService,
    request: &HttpRequest,
    team_id: i64,
    student_id: i64,
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

    match storage.remove_student_from_team(team.id, student_id).await {
        Ok(()) => {
            invalidate_cached_users(request, [student_id]).await;
            info!("Student {} removed from team {}", student_id, team.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Student removed from team")))
        }
        Err(e) => Ok(storage_error_response(e, ErrorCode::TeamMemberRemoveFailed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, http::StatusCode};

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_full_team_rejection_is_user_visible() {
        let err = RatingsError::capacity_exceeded("Team 'Team A' is full (5/5)");
        let response = storage_error_response(add_rejection(err), ErrorCode::TeamMemberAddFailed);
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["code"], ErrorCode::TeamCapacityExceeded as i32);
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("Failed to add team member."));
        assert!(message.contains("is full (5/5)"));
    }

    #[tokio::test]
    async fn test_already_assigned_rejection_is_user_visible() {
        let err = RatingsError::already_assigned("Student 7 already belongs to team 2");
        let response = storage_error_response(add_rejection(err), ErrorCode::TeamMemberAddFailed);
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["code"], ErrorCode::TeamAlreadyAssigned as i32);
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("Failed to add team member.")
        );
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = add_rejection(RatingsError::not_found("Team 9 not found"));
        assert_eq!(err, RatingsError::not_found("Team 9 not found"));
    }
}
