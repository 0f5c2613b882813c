pub mod available;
pub mod create;
pub mod delete;
pub mod get;
pub mod members;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::TeamConfig;
use crate::models::teams::requests::{AddMemberRequest, CreateTeamRequest, UpdateTeamRequest};
use crate::storage::Storage;

pub struct TeamService {
    storage: Option<Arc<dyn Storage>>,
}

impl TeamService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    // 在项目下创建团队
    pub async fn create_team(
        &self,
        request: &HttpRequest,
        project_id: i64,
        team_data: CreateTeamRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_team(self, request, project_id, team_data).await
    }

    // 项目下的团队及成员
    pub async fn list_teams(
        &self,
        request: &HttpRequest,
        project_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::list_teams(self, request, project_id).await
    }

    pub async fn get_team(&self, request: &HttpRequest, team_id: i64) -> ActixResult<HttpResponse> {
        get::get_team(self, request, team_id).await
    }

    pub async fn update_team(
        &self,
        request: &HttpRequest,
        team_id: i64,
        update_data: UpdateTeamRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_team(self, request, team_id, update_data).await
    }

    pub async fn delete_team(
        &self,
        request: &HttpRequest,
        team_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_team(self, request, team_id).await
    }

    pub async fn list_members(
        &self,
        request: &HttpRequest,
        team_id: i64,
    ) -> ActixResult<HttpResponse> {
        members::list_members(self, request, team_id).await
    }

    pub async fn add_member(
        &self,
        request: &HttpRequest,
        team_id: i64,
        member_data: AddMemberRequest,
    ) -> ActixResult<HttpResponse> {
        members::add_member(self, request, team_id, member_data).await
    }

    pub async fn remove_member(
        &self,
        request: &HttpRequest,
        team_id: i64,
        user_id: i64,
    ) -> ActixResult<HttpResponse> {
        members::remove_member(self, request, team_id, user_id).await
    }

    // 课程内尚未分组的学生
    pub async fn list_available_students(
        &self,
        request: &HttpRequest,
        team_id: i64,
    ) -> ActixResult<HttpResponse> {
        available::list_available_students(self, request, team_id).await
    }
}

/// 团队容量：未指定时取默认值，必须在 1..=max_capacity 内
pub(crate) fn resolve_capacity(requested: Option<i32>, config: &TeamConfig) -> Result<i32, String> {
    let capacity = requested.unwrap_or(config.default_capacity);
    if capacity < 1 || capacity > config.max_capacity {
        return Err(format!(
            "Team capacity must be between 1 and {}",
            config.max_capacity
        ));
    }
    Ok(capacity)
}

pub(crate) fn validate_team_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("Team name must not be empty");
    }
    if name.chars().count() > 64 {
        return Err("Team name must be at most 64 characters");
    }
    // '#' 留给仪表盘中同名团队的后缀
    if name.contains('#') {
        return Err("Team name must not contain '#'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TeamConfig {
        TeamConfig {
            default_capacity: 4,
            max_capacity: 8,
        }
    }

    #[test]
    fn test_resolve_capacity() {
        assert_eq!(resolve_capacity(None, &config()), Ok(4));
        assert_eq!(resolve_capacity(Some(8), &config()), Ok(8));
        assert!(resolve_capacity(Some(0), &config()).is_err());
        assert!(resolve_capacity(Some(9), &config()).is_err());
    }

    #[test]
    fn test_validate_team_name() {
        assert!(validate_team_name("Team A").is_ok());
        assert!(validate_team_name("").is_err());
        assert!(validate_team_name(&"x".repeat(65)).is_err());
        assert!(validate_team_name("Team #3").is_err());
    }
}
