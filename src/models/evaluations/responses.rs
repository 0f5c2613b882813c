use serde::Serialize;
use ts_rs::TS;

use crate::models::evaluations::entities::Evaluation;

/// 互评列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct EvaluationListResponse {
    pub items: Vec<Evaluation>,
}
