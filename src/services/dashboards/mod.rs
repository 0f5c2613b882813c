//! 仪表盘服务
//!
//! `GET /dashboard` 按当前用户角色分派到教师或学生仪表盘，
//! 其余接口是各角色仪表盘的子页面。

pub mod instructor;
pub mod student;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::dashboards::{
    entities::{Dashboard, DashboardKind},
    requests::StudentTeamsQuery,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

use super::{current_user, storage_error_response};

pub struct DashboardService {
    storage: Option<Arc<dyn Storage>>,
}

impl DashboardService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    // 按角色分派
    pub async fn dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);

        let dashboard = match DashboardKind::from(user.role) {
            DashboardKind::Instructor => storage
                .instructor_dashboard(user.id)
                .await
                .map(Dashboard::Instructor),
            DashboardKind::Student => storage
                .student_dashboard(user.id)
                .await
                .map(Dashboard::Student),
        };

        match dashboard {
            Ok(dashboard) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                dashboard,
                "Dashboard retrieved successfully",
            ))),
            Err(e) => Ok(storage_error_response(e, ErrorCode::InternalServerError)),
        }
    }

    pub async fn instructor_index(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        instructor::index(self, request).await
    }

    pub async fn instructor_teams(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        instructor::teams(self, request).await
    }

    pub async fn instructor_results(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        instructor::results(self, request).await
    }

    pub async fn student_index(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        student::index(self, request).await
    }

    pub async fn student_teams(
        &self,
        request: &HttpRequest,
        query: StudentTeamsQuery,
    ) -> ActixResult<HttpResponse> {
        student::teams(self, request, query).await
    }

    pub async fn student_evaluations(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        student::evaluations(self, request).await
    }

    pub async fn student_feedback(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        student::feedback(self, request).await
    }
}
