use std::collections::BTreeMap;

use serde::Serialize;
use ts_rs::TS;

use crate::models::evaluations::entities::{CategoryAverages, Evaluation};
use crate::models::projects::entities::Project;
use crate::models::teams::entities::TeamWithMembers;
use crate::models::users::entities::{User, UserRole};

// 教师仪表盘
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct InstructorDashboard {
    pub team_count: u64,
    pub evaluations_completed: u64,
    pub evaluations_pending: u64,
    pub avg_overall_ratings: CategoryAverages,
    /// 团队名 -> 该团队独立计算的四项平均分
    pub all_ratings: BTreeMap<String, CategoryAverages>,
}

// 学生仪表盘
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct StudentDashboard {
    /// 该学生尚需完成的互评
    pub pending_evaluations: Vec<Evaluation>,
    /// 该学生收到的互评
    pub received_evaluations: Vec<Evaluation>,
    /// 收到的已完成互评的平均分
    pub avg_ratings: CategoryAverages,
    pub evaluations_pending: u64,
    pub evaluations_completed: u64,
}

// 教师团队视图
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct InstructorTeamsView {
    pub teams: Vec<TeamWithMembers>,
    pub available_students: Vec<User>,
}

// 按项目分组的团队
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct ProjectTeams {
    pub project: Project,
    pub teams: Vec<TeamWithMembers>,
}

// 学生收到的反馈
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct StudentFeedback {
    pub received_evaluations: Vec<Evaluation>,
    pub avg_ratings: CategoryAverages,
}

/// 按角色区分的仪表盘
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "role", content = "dashboard", rename_all = "snake_case")]
#[ts(export, export_to = "dashboard.ts")]
pub enum Dashboard {
    Instructor(InstructorDashboard),
    Student(StudentDashboard),
}

/// 角色到仪表盘的分派表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardKind {
    Instructor,
    Student,
}

impl From<UserRole> for DashboardKind {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Instructor => DashboardKind::Instructor,
            UserRole::Student => DashboardKind::Student,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_kind_follows_role() {
        assert_eq!(
            DashboardKind::from(UserRole::Instructor),
            DashboardKind::Instructor
        );
        assert_eq!(DashboardKind::from(UserRole::Student), DashboardKind::Student);
    }

    #[test]
    fn test_dashboard_serializes_with_role_tag() {
        let dashboard = Dashboard::Instructor(InstructorDashboard {
            team_count: 0,
            evaluations_completed: 0,
            evaluations_pending: 0,
            avg_overall_ratings: CategoryAverages::default(),
            all_ratings: BTreeMap::new(),
        });
        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["role"], "instructor");
        assert!(json["dashboard"]["avg_overall_ratings"]["conceptual"].is_null());
    }
}
