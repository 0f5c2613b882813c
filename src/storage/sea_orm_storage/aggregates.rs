//! 互评聚合统计
//!
//! 平均分与计数全部交给数据库的 AVG / COUNT 完成，只统计 completed 状态的评分。
//! 范围内没有已完成的评价时 AVG 返回 NULL，对应这里的 `None`。
//! 各个 `*_on` 辅助函数对连接类型泛型，仪表盘可以在同一个事务里复用它们。

use std::collections::{BTreeMap, HashMap};

use super::SeaOrmStorage;
use crate::entity::evaluations::{Column, Entity as Evaluations};
use crate::entity::teams::{Column as TeamColumn, Entity as Teams};
use crate::errors::{RatingsError, Result};
use crate::models::evaluations::entities::{
    CategoryAverages, CompletionCounts, EvaluationScope, EvaluationStatus, RatingCategory,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
    sea_query::{Expr, Func, SimpleExpr},
};

fn rating_column(category: RatingCategory) -> Column {
    match category {
        RatingCategory::Conceptual => Column::ConceptualRating,
        RatingCategory::Practical => Column::PracticalRating,
        RatingCategory::Cooperation => Column::CooperationRating,
        RatingCategory::WorkEthic => Column::WorkEthicRating,
    }
}

fn avg_of(category: RatingCategory) -> SimpleExpr {
    Func::avg(Expr::col((Evaluations, rating_column(category)))).into()
}

impl SeaOrmStorage {
    /// 范围内的互评查询
    pub(super) fn scoped(scope: EvaluationScope) -> Select<Evaluations> {
        let select = Evaluations::find();
        match scope {
            EvaluationScope::Team(team_id) => select.filter(Column::TeamId.eq(team_id)),
            EvaluationScope::Instructor(instructor_id) => select
                .inner_join(Teams)
                .filter(TeamColumn::InstructorId.eq(instructor_id)),
            EvaluationScope::Evaluatee(user_id) => select.filter(Column::EvaluateeId.eq(user_id)),
            EvaluationScope::Evaluator(user_id) => select.filter(Column::EvaluatorId.eq(user_id)),
        }
    }

    pub async fn average_rating_impl(
        &self,
        scope: EvaluationScope,
        category: RatingCategory,
    ) -> Result<Option<f64>> {
        Self::average_rating_on(&self.db, scope, category).await
    }

    pub async fn average_ratings_impl(&self, scope: EvaluationScope) -> Result<CategoryAverages> {
        Self::average_ratings_on(&self.db, scope).await
    }

    pub async fn completion_counts_impl(&self, scope: EvaluationScope) -> Result<CompletionCounts> {
        Self::completion_counts_on(&self.db, scope).await
    }

    pub async fn per_team_breakdown_impl(
        &self,
        instructor_id: i64,
    ) -> Result<BTreeMap<String, CategoryAverages>> {
        Self::per_team_breakdown_on(&self.db, instructor_id).await
    }

    /// 单个维度的平均分
    pub(super) async fn average_rating_on<C: ConnectionTrait>(
        conn: &C,
        scope: EvaluationScope,
        category: RatingCategory,
    ) -> Result<Option<f64>> {
        let average = Self::scoped(scope)
            .filter(Column::Status.eq(EvaluationStatus::COMPLETED))
            .select_only()
            .column_as(avg_of(category), "average")
            .into_tuple::<Option<f64>>()
            .one(conn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("计算平均分失败: {e}")))?
            .flatten();

        Ok(average)
    }

    /// 四个维度的平均分，一条查询完成
    pub(super) async fn average_ratings_on<C: ConnectionTrait>(
        conn: &C,
        scope: EvaluationScope,
    ) -> Result<CategoryAverages> {
        let row = Self::scoped(scope)
            .filter(Column::Status.eq(EvaluationStatus::COMPLETED))
            .select_only()
            .column_as(avg_of(RatingCategory::Conceptual), "conceptual")
            .column_as(avg_of(RatingCategory::Practical), "practical")
            .column_as(avg_of(RatingCategory::Cooperation), "cooperation")
            .column_as(avg_of(RatingCategory::WorkEthic), "work_ethic")
            .into_tuple::<(Option<f64>, Option<f64>, Option<f64>, Option<f64>)>()
            .one(conn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("计算平均分失败: {e}")))?;

        Ok(match row {
            Some((conceptual, practical, cooperation, work_ethic)) => CategoryAverages {
                conceptual,
                practical,
                cooperation,
                work_ethic,
            },
            None => CategoryAverages::default(),
        })
    }

    /// 已完成 / 待评数量
    pub(super) async fn completion_counts_on<C: ConnectionTrait>(
        conn: &C,
        scope: EvaluationScope,
    ) -> Result<CompletionCounts> {
        let completed = Self::scoped(scope)
            .filter(Column::Status.eq(EvaluationStatus::COMPLETED))
            .count(conn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("统计互评数量失败: {e}")))?;

        let pending = Self::scoped(scope)
            .filter(Column::Status.eq(EvaluationStatus::PENDING))
            .count(conn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("统计互评数量失败: {e}")))?;

        Ok(CompletionCounts { completed, pending })
    }

    /// 教师名下每个团队独立计算的平均分，按团队名索引
    pub(super) async fn per_team_breakdown_on<C: ConnectionTrait>(
        conn: &C,
        instructor_id: i64,
    ) -> Result<BTreeMap<String, CategoryAverages>> {
        let teams = Teams::find()
            .filter(TeamColumn::InstructorId.eq(instructor_id))
            .order_by_asc(TeamColumn::Id)
            .all(conn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询团队列表失败: {e}")))?;

        let mut name_counts: HashMap<&str, usize> = HashMap::new();
        for team in &teams {
            *name_counts.entry(team.name.as_str()).or_default() += 1;
        }

        // 同名团队（来自不同项目）全部加上 " #id"；团队名不允许包含 '#'，键不会冲突
        let mut breakdown = BTreeMap::new();
        for team in &teams {
            let averages = Self::average_ratings_on(conn, EvaluationScope::Team(team.id)).await?;
            let key = if name_counts[team.name.as_str()] > 1 {
                format!("{} #{}", team.name, team.id)
            } else {
                team.name.clone()
            };
            breakdown.insert(key, averages);
        }

        Ok(breakdown)
    }

    pub(super) async fn count_teams_on<C: ConnectionTrait>(
        conn: &C,
        instructor_id: i64,
    ) -> Result<u64> {
        Teams::find()
            .filter(TeamColumn::InstructorId.eq(instructor_id))
            .count(conn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("统计团队数量失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::evaluations::tests::{ratings, seeded};
    use crate::models::evaluations::entities::{
        CategoryAverages, EvaluationScope, RatingCategory, Ratings,
    };
    use crate::models::projects::requests::CreateProjectRequest;
    use crate::models::teams::requests::CreateTeamRequest;

    #[tokio::test]
    async fn test_empty_scope_yields_none_and_zero_counts() {
        let (storage, instructor, teams) = seeded(&["Team A"], 2).await;

        let avg = storage
            .average_rating_impl(
                EvaluationScope::Instructor(instructor.id),
                RatingCategory::Conceptual,
            )
            .await
            .unwrap();
        assert_eq!(avg, None);

        let counts = storage
            .completion_counts_impl(EvaluationScope::Team(teams[0].0.id))
            .await
            .unwrap();
        assert_eq!(counts.completed, 0);
        assert_eq!(counts.pending, 0);

        let all = storage
            .average_ratings_impl(EvaluationScope::Team(teams[0].0.id))
            .await
            .unwrap();
        assert_eq!(all, CategoryAverages::default());
    }

    #[tokio::test]
    async fn test_submit_moves_evaluation_from_pending_to_completed() {
        let (storage, instructor, teams) = seeded(&["Team A"], 2).await;
        let created = storage
            .generate_team_evaluations_impl(teams[0].0.id)
            .await
            .unwrap();
        let scope = EvaluationScope::Instructor(instructor.id);

        let before = storage.completion_counts_impl(scope).await.unwrap();
        assert_eq!((before.completed, before.pending), (0, 2));

        storage
            .submit_evaluation_impl(created[0].id, created[0].evaluator_id, ratings(4.0), None)
            .await
            .unwrap();

        let after = storage.completion_counts_impl(scope).await.unwrap();
        assert_eq!((after.completed, after.pending), (1, 1));
    }

    #[tokio::test]
    async fn test_breakdown_is_computed_per_team() {
        // Team A：三条已完成评价，conceptual 为 4、5、6；Team B 没有评价
        let (storage, instructor, teams) = seeded(&["Team A", "Team B"], 3).await;
        let team_a = &teams[0].0;
        let created = storage.generate_team_evaluations_impl(team_a.id).await.unwrap();

        for (eval, conceptual) in created.iter().take(3).zip([4.0, 5.0, 6.0]) {
            storage
                .submit_evaluation_impl(
                    eval.id,
                    eval.evaluator_id,
                    Ratings {
                        conceptual,
                        practical: 3.0,
                        cooperation: 7.0,
                        work_ethic: 6.0,
                    },
                    None,
                )
                .await
                .unwrap();
        }

        let breakdown = storage.per_team_breakdown_impl(instructor.id).await.unwrap();
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown["Team A"].conceptual, Some(5.0));
        assert_eq!(breakdown["Team A"].practical, Some(3.0));
        assert_eq!(breakdown["Team B"].conceptual, None);
        assert_eq!(breakdown["Team B"], CategoryAverages::default());

        let overall = storage
            .average_rating_impl(
                EvaluationScope::Instructor(instructor.id),
                RatingCategory::Conceptual,
            )
            .await
            .unwrap();
        assert_eq!(overall, Some(5.0));

        // 其余三条仍为 pending，不参与平均
        let counts = storage
            .completion_counts_impl(EvaluationScope::Team(team_a.id))
            .await
            .unwrap();
        assert_eq!((counts.completed, counts.pending), (3, 3));
    }

    #[tokio::test]
    async fn test_scopes_do_not_leak_between_instructors() {
        let (storage, _, teams) = seeded(&["Team A"], 2).await;
        let created = storage
            .generate_team_evaluations_impl(teams[0].0.id)
            .await
            .unwrap();
        storage
            .submit_evaluation_impl(created[0].id, created[0].evaluator_id, ratings(7.0), None)
            .await
            .unwrap();

        let other = storage
            .average_ratings_impl(EvaluationScope::Instructor(9999))
            .await
            .unwrap();
        assert_eq!(other, CategoryAverages::default());

        let received = storage
            .average_ratings_impl(EvaluationScope::Evaluatee(created[0].evaluatee_id))
            .await
            .unwrap();
        assert_eq!(received.work_ethic, Some(7.0));
    }

    #[tokio::test]
    async fn test_single_category_matches_combined_averages() {
        let (storage, instructor, teams) = seeded(&["Team A"], 2).await;
        let created = storage
            .generate_team_evaluations_impl(teams[0].0.id)
            .await
            .unwrap();
        let submitted = Ratings {
            conceptual: 2.0,
            practical: 3.5,
            cooperation: 5.0,
            work_ethic: 6.5,
        };
        storage
            .submit_evaluation_impl(created[0].id, created[0].evaluator_id, submitted, None)
            .await
            .unwrap();

        let scope = EvaluationScope::Instructor(instructor.id);
        let combined = storage.average_ratings_impl(scope).await.unwrap();
        for category in RatingCategory::ALL {
            let single = storage.average_rating_impl(scope, category).await.unwrap();
            assert_eq!(single, combined.get(category));
            assert_eq!(single, Some(submitted.get(category)));
        }
    }

    #[tokio::test]
    async fn test_same_named_teams_get_distinct_keys() {
        let (storage, instructor, teams) = seeded(&["Team A", "Team B"], 2).await;
        let course_id = storage
            .get_project_by_id_impl(teams[0].0.project_id)
            .await
            .unwrap()
            .unwrap()
            .course_id;
        let sprint2 = storage
            .create_project_impl(
                course_id,
                CreateProjectRequest {
                    title: "Sprint 2".to_string(),
                    description: None,
                    due_date: chrono::Utc::now(),
                },
            )
            .await
            .unwrap();
        let again = storage
            .create_team_impl(
                sprint2.id,
                instructor.id,
                5,
                CreateTeamRequest {
                    name: "Team A".to_string(),
                    description: None,
                    capacity: None,
                },
            )
            .await
            .unwrap();

        let breakdown = storage.per_team_breakdown_impl(instructor.id).await.unwrap();
        let keys: Vec<_> = breakdown.keys().cloned().collect();
        let mut expected = vec![
            format!("Team A #{}", teams[0].0.id),
            format!("Team A #{}", again.id),
            "Team B".to_string(),
        ];
        expected.sort();
        assert_eq!(keys, expected);
    }
}
