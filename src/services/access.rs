//! 资源访问校验
//!
//! 课程归属于开课教师，学生需要选课才能看到课程下的项目与团队。
//! 项目、团队的访问都沿所属课程判断；写操作只允许课程的教师。
//! 校验失败直接返回可用作响应的 `HttpResponse`。

use actix_web::HttpResponse;
use std::sync::Arc;
use tracing::info;

use super::storage_error_response;
use crate::models::{
    ApiResponse, ErrorCode,
    courses::entities::Course,
    projects::entities::Project,
    teams::entities::Team,
    users::entities::{User, UserRole},
};
use crate::storage::Storage;

/// 读权限：教师本人，或已选课的学生
fn can_view(user: &User, course: &Course, enrolled: bool) -> bool {
    match user.role {
        UserRole::Instructor => course.instructor_id == user.id,
        UserRole::Student => enrolled,
    }
}

fn denied(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, message))
}

async fn load_course(storage: &Arc<dyn Storage>, course_id: i64) -> Result<Course, HttpResponse> {
    match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => Ok(course),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Course not found",
        ))),
        Err(e) => Err(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}

/// 可读的课程
pub(crate) async fn course_for_user(
    storage: &Arc<dyn Storage>,
    user: &User,
    course_id: i64,
) -> Result<Course, HttpResponse> {
    let course = load_course(storage, course_id).await?;

    let enrolled = if user.is_student() {
        storage
            .is_enrolled(course.id, user.id)
            .await
            .map_err(|e| storage_error_response(e, ErrorCode::InternalServerError))?
    } else {
        false
    };

    if can_view(user, &course, enrolled) {
        Ok(course)
    } else {
        info!("User {} denied access to course {}", user.id, course.id);
        Err(denied(
            ErrorCode::CoursePermissionDenied,
            "You do not have access to this course",
        ))
    }
}

/// 当前教师所授的课程
pub(crate) async fn owned_course(
    storage: &Arc<dyn Storage>,
    user: &User,
    course_id: i64,
) -> Result<Course, HttpResponse> {
    let course = load_course(storage, course_id).await?;
    if course.instructor_id != user.id {
        info!("Instructor {} does not own course {}", user.id, course.id);
        return Err(denied(
            ErrorCode::CoursePermissionDenied,
            "You do not teach this course",
        ));
    }
    Ok(course)
}

async fn load_project(storage: &Arc<dyn Storage>, project_id: i64) -> Result<Project, HttpResponse> {
    match storage.get_project_by_id(project_id).await {
        Ok(Some(project)) => Ok(project),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ProjectNotFound,
            "Project not found",
        ))),
        Err(e) => Err(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}

pub(crate) async fn project_for_user(
    storage: &Arc<dyn Storage>,
    user: &User,
    project_id: i64,
) -> Result<(Project, Course), HttpResponse> {
    let project = load_project(storage, project_id).await?;
    let course = course_for_user(storage, user, project.course_id).await?;
    Ok((project, course))
}

pub(crate) async fn owned_project(
    storage: &Arc<dyn Storage>,
    user: &User,
    project_id: i64,
) -> Result<(Project, Course), HttpResponse> {
    let project = load_project(storage, project_id).await?;
    let course = owned_course(storage, user, project.course_id).await?;
    Ok((project, course))
}

async fn load_team(storage: &Arc<dyn Storage>, team_id: i64) -> Result<Team, HttpResponse> {
    match storage.get_team_by_id(team_id).await {
        Ok(Some(team)) => Ok(team),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TeamNotFound,
            "Team not found",
        ))),
        Err(e) => Err(storage_error_response(e, ErrorCode::InternalServerError)),
    }
}

/// 可读的团队：团队教师，或选了该项目课程的学生
pub(crate) async fn team_for_user(
    storage: &Arc<dyn Storage>,
    user: &User,
    team_id: i64,
) -> Result<Team, HttpResponse> {
    let team = load_team(storage, team_id).await?;
    if user.is_instructor() && team.instructor_id == user.id {
        return Ok(team);
    }
    project_for_user(storage, user, team.project_id).await?;
    Ok(team)
}

/// 当前教师负责的团队
pub(crate) async fn owned_team(
    storage: &Arc<dyn Storage>,
    user: &User,
    team_id: i64,
) -> Result<Team, HttpResponse> {
    let team = load_team(storage, team_id).await?;
    if team.instructor_id != user.id {
        info!("Instructor {} does not lead team {}", user.id, team.id);
        return Err(denied(
            ErrorCode::Forbidden,
            "You are not the instructor of this team",
        ));
    }
    Ok(team)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, role: UserRole) -> User {
        User {
            id,
            email: format!("u{id}@example.com"),
            password_hash: String::new(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role,
            student_number: None,
            team_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn course(instructor_id: i64) -> Course {
        Course {
            id: 1,
            instructor_id,
            title: "Software Process".to_string(),
            code: "SOFE3490".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_course_visibility() {
        let owner = user(1, UserRole::Instructor);
        let other = user(2, UserRole::Instructor);
        let student = user(3, UserRole::Student);
        let c = course(1);

        assert!(can_view(&owner, &c, false));
        assert!(!can_view(&other, &c, false));
        assert!(can_view(&student, &c, true));
        assert!(!can_view(&student, &c, false));
    }
}
