pub mod create;
pub mod delete;
pub mod get;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::projects::requests::CreateProjectRequest;
use crate::storage::Storage;

pub struct ProjectService {
    storage: Option<Arc<dyn Storage>>,
}

impl ProjectService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    // 在课程下创建项目
    pub async fn create_project(
        &self,
        request: &HttpRequest,
        course_id: i64,
        project_data: CreateProjectRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_project(self, request, course_id, project_data).await
    }

    pub async fn list_projects(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_projects(self, request, course_id).await
    }

    pub async fn get_project(
        &self,
        request: &HttpRequest,
        project_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_project(self, request, project_id).await
    }

    pub async fn delete_project(
        &self,
        request: &HttpRequest,
        project_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_project(self, request, project_id).await
    }
}
