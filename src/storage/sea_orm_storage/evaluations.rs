//! 互评存储操作

use std::collections::HashSet;

use super::SeaOrmStorage;
use crate::entity::evaluations::{ActiveModel, Column, Entity as Evaluations};
use crate::entity::teams::Entity as Teams;
use crate::errors::{RatingsError, Result};
use crate::models::evaluations::entities::{
    Evaluation, EvaluationScope, EvaluationStatus, Ratings,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

impl SeaOrmStorage {
    /// 为团队成员两两生成待评记录
    pub async fn generate_team_evaluations_impl(&self, team_id: i64) -> Result<Vec<Evaluation>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RatingsError::database_operation(format!("开启事务失败: {e}")))?;

        let team = Teams::find_by_id(team_id)
            .one(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询团队失败: {e}")))?
            .ok_or_else(|| RatingsError::not_found(format!("Team {team_id} not found")))?;

        let member_ids: Vec<i64> = Self::members_on(&txn, team_id)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        // 同一项目中每对评价人/被评价人只生成一次
        let existing: HashSet<(i64, i64)> = Evaluations::find()
            .select_only()
            .column(Column::EvaluatorId)
            .column(Column::EvaluateeId)
            .filter(Column::ProjectId.eq(team.project_id))
            .filter(Column::EvaluatorId.is_in(member_ids.clone()))
            .into_tuple::<(i64, i64)>()
            .all(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询已有互评失败: {e}")))?
            .into_iter()
            .collect();

        let mut created = Vec::new();
        for &evaluator_id in &member_ids {
            for &evaluatee_id in &member_ids {
                if evaluator_id == evaluatee_id
                    || existing.contains(&(evaluator_id, evaluatee_id))
                {
                    continue;
                }

                let model = ActiveModel {
                    evaluator_id: Set(evaluator_id),
                    evaluatee_id: Set(evaluatee_id),
                    team_id: Set(team_id),
                    project_id: Set(team.project_id),
                    conceptual_rating: Set(None),
                    practical_rating: Set(None),
                    cooperation_rating: Set(None),
                    work_ethic_rating: Set(None),
                    status: Set(EvaluationStatus::Pending.to_string()),
                    comment: Set(None),
                    date_completed: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(|e| RatingsError::database_operation(format!("创建互评失败: {e}")))?;

                created.push(model.into_evaluation());
            }
        }

        txn.commit()
            .await
            .map_err(|e| RatingsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(created)
    }

    /// 通过 ID 获取互评
    pub async fn get_evaluation_by_id_impl(&self, evaluation_id: i64) -> Result<Option<Evaluation>> {
        let result = Evaluations::find_by_id(evaluation_id)
            .one(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询互评失败: {e}")))?;

        Ok(result.map(|m| m.into_evaluation()))
    }

    /// 提交评分
    pub async fn submit_evaluation_impl(
        &self,
        evaluation_id: i64,
        evaluator_id: i64,
        ratings: Ratings,
        comment: Option<String>,
    ) -> Result<Evaluation> {
        let now = chrono::Utc::now().timestamp();

        let existing = self
            .get_evaluation_by_id_impl(evaluation_id)
            .await?
            .ok_or_else(|| {
                RatingsError::not_found(format!("Evaluation {evaluation_id} not found"))
            })?;

        if existing.evaluator_id != evaluator_id {
            return Err(RatingsError::authorization(
                "Only the evaluator can submit this evaluation",
            ));
        }

        // 条件更新：只有 pending 状态会被改写，completed 为终态
        let result = Evaluations::update_many()
            .col_expr(Column::ConceptualRating, Expr::value(Some(ratings.conceptual)))
            .col_expr(Column::PracticalRating, Expr::value(Some(ratings.practical)))
            .col_expr(Column::CooperationRating, Expr::value(Some(ratings.cooperation)))
            .col_expr(Column::WorkEthicRating, Expr::value(Some(ratings.work_ethic)))
            .col_expr(Column::Comment, Expr::value(comment))
            .col_expr(
                Column::Status,
                Expr::value(EvaluationStatus::Completed.to_string()),
            )
            .col_expr(Column::DateCompleted, Expr::value(Some(now)))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(evaluation_id))
            .filter(Column::Status.eq(EvaluationStatus::PENDING))
            .exec(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("提交互评失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(RatingsError::validation(
                "Evaluation has already been submitted",
            ));
        }

        self.get_evaluation_by_id_impl(evaluation_id)
            .await?
            .ok_or_else(|| RatingsError::not_found(format!("Evaluation {evaluation_id} not found")))
    }

    /// 按范围与状态列出互评
    pub async fn list_evaluations_impl(
        &self,
        scope: EvaluationScope,
        status: Option<EvaluationStatus>,
    ) -> Result<Vec<Evaluation>> {
        Self::evaluations_on(&self.db, scope, status).await
    }

    /// 项目中所有待评记录，按评价人分组前先排好序
    pub async fn list_pending_evaluations_by_project_impl(
        &self,
        project_id: i64,
    ) -> Result<Vec<Evaluation>> {
        let evaluations = Evaluations::find()
            .filter(Column::ProjectId.eq(project_id))
            .filter(Column::Status.eq(EvaluationStatus::PENDING))
            .order_by_asc(Column::EvaluatorId)
            .order_by_asc(Column::EvaluateeId)
            .all(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询待评记录失败: {e}")))?;

        Ok(evaluations.into_iter().map(|m| m.into_evaluation()).collect())
    }

    pub(super) async fn evaluations_on<C: ConnectionTrait>(
        conn: &C,
        scope: EvaluationScope,
        status: Option<EvaluationStatus>,
    ) -> Result<Vec<Evaluation>> {
        let mut select = Self::scoped(scope);
        if let Some(status) = status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let evaluations = select
            .order_by_desc(Column::UpdatedAt)
            .order_by_asc(Column::Id)
            .all(conn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询互评列表失败: {e}")))?;

        Ok(evaluations.into_iter().map(|m| m.into_evaluation()).collect())
    }
}

#[cfg(test)]
pub(super) mod tests {
    use super::super::SeaOrmStorage;
    use super::super::test_support::{create_test_user, memory_storage};
    use crate::errors::RatingsError;
    use crate::models::courses::requests::CreateCourseRequest;
    use crate::models::evaluations::entities::{EvaluationScope, EvaluationStatus, Ratings};
    use crate::models::projects::requests::CreateProjectRequest;
    use crate::models::teams::entities::Team;
    use crate::models::teams::requests::CreateTeamRequest;
    use crate::models::users::entities::{User, UserRole};

    pub(crate) fn ratings(value: f64) -> Ratings {
        Ratings {
            conceptual: value,
            practical: value,
            cooperation: value,
            work_ethic: value,
        }
    }

    /// 一位教师、一个项目、给定名字的若干团队，每队填入 `per_team` 个学生
    pub(crate) async fn seeded(
        team_names: &[&str],
        per_team: usize,
    ) -> (SeaOrmStorage, User, Vec<(Team, Vec<User>)>) {
        let storage = memory_storage().await;
        let instructor =
            create_test_user(&storage, "prof@example.com", UserRole::Instructor).await;
        let course = storage
            .create_course_impl(
                instructor.id,
                CreateCourseRequest {
                    title: "Software Process".to_string(),
                    code: "SOEN-341".to_string(),
                },
            )
            .await
            .unwrap();
        let project = storage
            .create_project_impl(
                course.id,
                CreateProjectRequest {
                    title: "Sprint 1".to_string(),
                    description: Some("First sprint".to_string()),
                    due_date: chrono::Utc::now(),
                },
            )
            .await
            .unwrap();

        let mut teams = Vec::new();
        for (t, name) in team_names.iter().enumerate() {
            let team = storage
                .create_team_impl(
                    project.id,
                    instructor.id,
                    5,
                    CreateTeamRequest {
                        name: name.to_string(),
                        description: None,
                        capacity: None,
                    },
                )
                .await
                .unwrap();
            let mut members = Vec::new();
            for i in 0..per_team {
                let student = create_test_user(
                    &storage,
                    &format!("t{t}s{i}@example.com"),
                    UserRole::Student,
                )
                .await;
                storage
                    .add_student_to_team_impl(team.id, student.id)
                    .await
                    .unwrap();
                members.push(student);
            }
            teams.push((team, members));
        }

        (storage, instructor, teams)
    }

    #[tokio::test]
    async fn test_generate_creates_each_ordered_pair_once() {
        let (storage, _, teams) = seeded(&["Team A"], 3).await;
        let team = &teams[0].0;

        let created = storage.generate_team_evaluations_impl(team.id).await.unwrap();
        assert_eq!(created.len(), 6);
        assert!(created.iter().all(|e| e.status == EvaluationStatus::Pending));
        assert!(created.iter().all(|e| e.ratings.is_none()));
        assert!(created.iter().all(|e| e.evaluator_id != e.evaluatee_id));

        let again = storage.generate_team_evaluations_impl(team.id).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_submit_completes_pending_and_is_terminal() {
        let (storage, _, teams) = seeded(&["Team A"], 2).await;
        let (team, members) = &teams[0];
        let created = storage.generate_team_evaluations_impl(team.id).await.unwrap();
        let eval = created
            .iter()
            .find(|e| e.evaluator_id == members[0].id)
            .unwrap();

        let err = storage
            .submit_evaluation_impl(eval.id, members[1].id, ratings(5.0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RatingsError::Authorization(_)));

        let done = storage
            .submit_evaluation_impl(
                eval.id,
                members[0].id,
                ratings(6.0),
                Some("Solid work".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(done.status, EvaluationStatus::Completed);
        assert_eq!(done.ratings, Some(ratings(6.0)));
        assert!(done.date_completed.is_some());
        assert_eq!(done.comment.as_deref(), Some("Solid work"));

        let err = storage
            .submit_evaluation_impl(eval.id, members[0].id, ratings(2.0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RatingsError::Validation(_)));

        let still = storage.get_evaluation_by_id_impl(eval.id).await.unwrap().unwrap();
        assert_eq!(still.ratings, Some(ratings(6.0)));
    }

    #[tokio::test]
    async fn test_list_by_scope_and_status() {
        let (storage, instructor, teams) = seeded(&["Team A", "Team B"], 2).await;
        for (team, _) in &teams {
            storage.generate_team_evaluations_impl(team.id).await.unwrap();
        }

        let all = storage
            .list_evaluations_impl(EvaluationScope::Instructor(instructor.id), None)
            .await
            .unwrap();
        assert_eq!(all.len(), 4);

        let team_a = storage
            .list_evaluations_impl(
                EvaluationScope::Team(teams[0].0.id),
                Some(EvaluationStatus::Pending),
            )
            .await
            .unwrap();
        assert_eq!(team_a.len(), 2);

        let project_pending = storage
            .list_pending_evaluations_by_project_impl(teams[0].0.project_id)
            .await
            .unwrap();
        assert_eq!(project_pending.len(), 4);
    }
}
