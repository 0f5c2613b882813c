use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{
    courses::{entities::Course, requests::CreateCourseRequest},
    dashboards::entities::{InstructorDashboard, StudentDashboard, StudentFeedback},
    evaluations::entities::{
        CategoryAverages, CompletionCounts, Evaluation, EvaluationScope, EvaluationStatus,
        RatingCategory, Ratings,
    },
    projects::{entities::Project, requests::CreateProjectRequest},
    teams::{
        entities::{Team, TeamWithMembers},
        requests::{CreateTeamRequest, UpdateTeamRequest},
    },
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 课程管理方法
    async fn create_course(&self, instructor_id: i64, course: CreateCourseRequest)
    -> Result<Course>;
    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>>;
    async fn get_course_by_code(&self, code: &str) -> Result<Option<Course>>;
    // 教师所授课程
    async fn list_courses_by_instructor(&self, instructor_id: i64) -> Result<Vec<Course>>;
    // 学生所选课程
    async fn list_courses_by_student(&self, student_id: i64) -> Result<Vec<Course>>;
    // 批量选课，非学生与已选课的用户会被跳过，返回新增数量
    async fn enroll_students(&self, course_id: i64, user_ids: &[i64]) -> Result<u64>;
    async fn is_enrolled(&self, course_id: i64, user_id: i64) -> Result<bool>;
    async fn list_course_students(&self, course_id: i64) -> Result<Vec<User>>;

    /// 项目管理方法
    async fn create_project(&self, course_id: i64, project: CreateProjectRequest)
    -> Result<Project>;
    async fn get_project_by_id(&self, project_id: i64) -> Result<Option<Project>>;
    async fn list_projects_by_course(&self, course_id: i64) -> Result<Vec<Project>>;
    // 删除项目，同时清空其团队成员的团队引用
    async fn delete_project(&self, project_id: i64) -> Result<bool>;

    /// 团队管理方法
    async fn create_team(
        &self,
        project_id: i64,
        instructor_id: i64,
        capacity: i32,
        team: CreateTeamRequest,
    ) -> Result<Team>;
    async fn get_team_by_id(&self, team_id: i64) -> Result<Option<Team>>;
    async fn get_team_with_members(&self, team_id: i64) -> Result<Option<TeamWithMembers>>;
    async fn list_teams_by_project(&self, project_id: i64) -> Result<Vec<TeamWithMembers>>;
    async fn list_teams_by_instructor(&self, instructor_id: i64) -> Result<Vec<TeamWithMembers>>;
    async fn update_team(&self, team_id: i64, update: UpdateTeamRequest) -> Result<Option<Team>>;
    // 删除团队，同时清空成员的团队引用
    async fn delete_team(&self, team_id: i64) -> Result<bool>;
    async fn list_team_members(&self, team_id: i64) -> Result<Vec<User>>;
    // 选了该课程且尚未分组的学生
    async fn list_available_students(&self, course_id: i64) -> Result<Vec<User>>;
    // 选了该教师任一课程且尚未分组的学生
    async fn list_available_students_by_instructor(&self, instructor_id: i64)
    -> Result<Vec<User>>;

    /// 团队成员管理方法
    // 将学生加入团队，返回更新后的成员列表
    async fn add_student_to_team(&self, team_id: i64, student_id: i64) -> Result<Vec<User>>;
    // 将学生移出团队
    async fn remove_student_from_team(&self, team_id: i64, student_id: i64) -> Result<()>;

    /// 互评管理方法
    // 为团队成员两两生成待评记录，返回新生成的记录
    async fn generate_team_evaluations(&self, team_id: i64) -> Result<Vec<Evaluation>>;
    async fn get_evaluation_by_id(&self, evaluation_id: i64) -> Result<Option<Evaluation>>;
    // 提交评分：pending -> completed
    async fn submit_evaluation(
        &self,
        evaluation_id: i64,
        evaluator_id: i64,
        ratings: Ratings,
        comment: Option<String>,
    ) -> Result<Evaluation>;
    async fn list_evaluations(
        &self,
        scope: EvaluationScope,
        status: Option<EvaluationStatus>,
    ) -> Result<Vec<Evaluation>>;
    async fn list_pending_evaluations_by_project(&self, project_id: i64)
    -> Result<Vec<Evaluation>>;

    /// 聚合统计方法
    async fn average_rating(
        &self,
        scope: EvaluationScope,
        category: RatingCategory,
    ) -> Result<Option<f64>>;
    async fn average_ratings(&self, scope: EvaluationScope) -> Result<CategoryAverages>;
    async fn completion_counts(&self, scope: EvaluationScope) -> Result<CompletionCounts>;
    async fn per_team_breakdown(
        &self,
        instructor_id: i64,
    ) -> Result<BTreeMap<String, CategoryAverages>>;

    /// 仪表盘（单个只读事务内完成）
    async fn instructor_dashboard(&self, instructor_id: i64) -> Result<InstructorDashboard>;
    async fn student_dashboard(&self, student_id: i64) -> Result<StudentDashboard>;
    async fn student_feedback(&self, student_id: i64) -> Result<StudentFeedback>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
