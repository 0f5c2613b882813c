pub mod generate;
pub mod get;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::evaluations::requests::SubmitEvaluationRequest;
use crate::storage::Storage;

pub struct EvaluationService {
    storage: Option<Arc<dyn Storage>>,
}

impl EvaluationService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    // 为团队成员生成待评记录
    pub async fn generate_for_team(
        &self,
        request: &HttpRequest,
        team_id: i64,
    ) -> ActixResult<HttpResponse> {
        generate::generate_for_team(self, request, team_id).await
    }

    pub async fn get_evaluation(
        &self,
        request: &HttpRequest,
        evaluation_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_evaluation(self, request, evaluation_id).await
    }

    // 评价人提交评分
    pub async fn submit_evaluation(
        &self,
        request: &HttpRequest,
        evaluation_id: i64,
        submit_data: SubmitEvaluationRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_evaluation(self, request, evaluation_id, submit_data).await
    }
}
