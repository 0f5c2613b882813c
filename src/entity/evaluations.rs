//! 互评实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub evaluator_id: i64,
    pub evaluatee_id: i64,
    pub team_id: i64,
    pub project_id: i64,
    pub conceptual_rating: Option<f64>,
    pub practical_rating: Option<f64>,
    pub cooperation_rating: Option<f64>,
    pub work_ethic_rating: Option<f64>,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub date_completed: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::EvaluatorId",
        to = "super::users::Column::Id"
    )]
    Evaluator,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::EvaluateeId",
        to = "super::users::Column::Id"
    )]
    Evaluatee,
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id"
    )]
    Team,
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Project,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_evaluation(self) -> crate::models::evaluations::entities::Evaluation {
        use crate::models::evaluations::entities::{Evaluation, EvaluationStatus, Ratings};
        use chrono::{DateTime, Utc};

        // 四项评分要么全部存在（已完成），要么全部为空（待评）
        let ratings = match (
            self.conceptual_rating,
            self.practical_rating,
            self.cooperation_rating,
            self.work_ethic_rating,
        ) {
            (Some(conceptual), Some(practical), Some(cooperation), Some(work_ethic)) => {
                Some(Ratings {
                    conceptual,
                    practical,
                    cooperation,
                    work_ethic,
                })
            }
            _ => None,
        };

        Evaluation {
            id: self.id,
            evaluator_id: self.evaluator_id,
            evaluatee_id: self.evaluatee_id,
            team_id: self.team_id,
            project_id: self.project_id,
            status: self
                .status
                .parse::<EvaluationStatus>()
                .unwrap_or(EvaluationStatus::Pending),
            ratings,
            comment: self.comment,
            date_completed: self
                .date_completed
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
