//! 仪表盘数据组装
//!
//! 只读组合，所有计数与平均分在同一个事务内读取，避免请求期间的写入导致数据错位。

use super::SeaOrmStorage;
use crate::errors::{RatingsError, Result};
use crate::models::dashboards::entities::{
    InstructorDashboard, StudentDashboard, StudentFeedback,
};
use crate::models::evaluations::entities::{EvaluationScope, EvaluationStatus};
use sea_orm::TransactionTrait;

impl SeaOrmStorage {
    pub async fn instructor_dashboard_impl(&self, instructor_id: i64) -> Result<InstructorDashboard> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RatingsError::database_operation(format!("开启事务失败: {e}")))?;
        let scope = EvaluationScope::Instructor(instructor_id);

        let team_count = Self::count_teams_on(&txn, instructor_id).await?;
        let counts = Self::completion_counts_on(&txn, scope).await?;
        let avg_overall_ratings = Self::average_ratings_on(&txn, scope).await?;
        let all_ratings = Self::per_team_breakdown_on(&txn, instructor_id).await?;

        txn.commit()
            .await
            .map_err(|e| RatingsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(InstructorDashboard {
            team_count,
            evaluations_completed: counts.completed,
            evaluations_pending: counts.pending,
            avg_overall_ratings,
            all_ratings,
        })
    }

    pub async fn student_dashboard_impl(&self, student_id: i64) -> Result<StudentDashboard> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RatingsError::database_operation(format!("开启事务失败: {e}")))?;

        // 需要该学生去完成的
        let pending_evaluations = Self::evaluations_on(
            &txn,
            EvaluationScope::Evaluator(student_id),
            Some(EvaluationStatus::Pending),
        )
        .await?;
        // 该学生收到的
        let received_evaluations = Self::evaluations_on(
            &txn,
            EvaluationScope::Evaluatee(student_id),
            Some(EvaluationStatus::Completed),
        )
        .await?;
        let avg_ratings =
            Self::average_ratings_on(&txn, EvaluationScope::Evaluatee(student_id)).await?;

        txn.commit()
            .await
            .map_err(|e| RatingsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(StudentDashboard {
            evaluations_pending: pending_evaluations.len() as u64,
            evaluations_completed: received_evaluations.len() as u64,
            pending_evaluations,
            received_evaluations,
            avg_ratings,
        })
    }

    pub async fn student_feedback_impl(&self, student_id: i64) -> Result<StudentFeedback> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RatingsError::database_operation(format!("开启事务失败: {e}")))?;

        let received_evaluations = Self::evaluations_on(
            &txn,
            EvaluationScope::Evaluatee(student_id),
            Some(EvaluationStatus::Completed),
        )
        .await?;
        let avg_ratings =
            Self::average_ratings_on(&txn, EvaluationScope::Evaluatee(student_id)).await?;

        txn.commit()
            .await
            .map_err(|e| RatingsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(StudentFeedback {
            received_evaluations,
            avg_ratings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::evaluations::tests::{ratings, seeded};

    #[tokio::test]
    async fn test_student_with_one_pending_and_one_completed() {
        let (storage, _, teams) = seeded(&["Team A"], 2).await;
        let members = &teams[0].1;
        let created = storage
            .generate_team_evaluations_impl(teams[0].0.id)
            .await
            .unwrap();

        // 队友给 members[0] 的评价已提交；members[0] 给队友的仍待完成
        let received = created
            .iter()
            .find(|e| e.evaluatee_id == members[0].id)
            .unwrap();
        storage
            .submit_evaluation_impl(received.id, received.evaluator_id, ratings(5.5), None)
            .await
            .unwrap();

        let dashboard = storage.student_dashboard_impl(members[0].id).await.unwrap();
        assert_eq!(dashboard.evaluations_pending, 1);
        assert_eq!(dashboard.evaluations_completed, 1);
        assert_eq!(dashboard.pending_evaluations[0].evaluatee_id, members[1].id);
        assert_eq!(dashboard.avg_ratings.conceptual, Some(5.5));

        let feedback = storage.student_feedback_impl(members[0].id).await.unwrap();
        assert_eq!(feedback.received_evaluations.len(), 1);
    }

    #[tokio::test]
    async fn test_instructor_dashboard_composes_counts_and_breakdown() {
        let (storage, instructor, teams) = seeded(&["Team A", "Team B"], 2).await;
        let created = storage
            .generate_team_evaluations_impl(teams[0].0.id)
            .await
            .unwrap();
        storage
            .submit_evaluation_impl(created[0].id, created[0].evaluator_id, ratings(4.0), None)
            .await
            .unwrap();

        let dashboard = storage
            .instructor_dashboard_impl(instructor.id)
            .await
            .unwrap();
        assert_eq!(dashboard.team_count, 2);
        assert_eq!(dashboard.evaluations_completed, 1);
        assert_eq!(dashboard.evaluations_pending, 1);
        assert_eq!(dashboard.avg_overall_ratings.cooperation, Some(4.0));
        assert_eq!(dashboard.all_ratings["Team A"].conceptual, Some(4.0));
        assert_eq!(dashboard.all_ratings["Team B"].conceptual, None);
    }

    #[tokio::test]
    async fn test_dashboards_for_unknown_users_are_empty() {
        let (storage, _, _) = seeded(&[], 0).await;
        let dashboard = storage.instructor_dashboard_impl(4242).await.unwrap();
        assert_eq!(dashboard.team_count, 0);
        assert!(dashboard.all_ratings.is_empty());
        assert_eq!(dashboard.avg_overall_ratings.work_ethic, None);

        let student = storage.student_dashboard_impl(4242).await.unwrap();
        assert_eq!(student.evaluations_pending, 0);
        assert!(student.received_evaluations.is_empty());
    }
}
