//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod aggregates;
mod courses;
mod dashboards;
mod evaluations;
mod projects;
mod teams;
mod users;

use crate::config::AppConfig;
use crate::errors::{RatingsError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| RatingsError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 使用已建立的连接创建存储实例（不运行迁移）
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| RatingsError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| RatingsError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| RatingsError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(RatingsError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::SeaOrmStorage;
    use crate::models::users::{entities::User, entities::UserRole, requests::CreateUserRequest};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use sea_orm::{ConnectOptions, Database, SqlxSqliteConnector};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    /// 内存 SQLite + 真实迁移，单连接保证所有查询看到同一个库
    pub(crate) async fn memory_storage() -> SeaOrmStorage {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmStorage::from_connection(db)
    }

    /// 临时文件 SQLite（WAL），多连接池，用于验证并发事务
    pub(crate) async fn file_storage(name: &str, max_connections: u32) -> (SeaOrmStorage, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "real_ratings_{}_{}_{}.db",
            name,
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let opt = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(max_connections)
            .connect_with(opt)
            .await
            .unwrap();
        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
        Migrator::up(&db, None).await.unwrap();
        (SeaOrmStorage::from_connection(db), path)
    }

    pub(crate) fn remove_file_storage(path: &Path) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.as_os_str().to_owned();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }

    pub(crate) async fn create_test_user(
        storage: &SeaOrmStorage,
        email: &str,
        role: UserRole,
    ) -> User {
        storage
            .create_user_impl(CreateUserRequest {
                email: email.to_string(),
                password: "hashed".to_string(),
                first_name: email.split('@').next().unwrap_or("user").to_string(),
                last_name: "Test".to_string(),
                role,
                student_number: None,
            })
            .await
            .unwrap()
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;
use std::collections::BTreeMap;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 课程模块
    async fn create_course(
        &self,
        instructor_id: i64,
        course: CreateCourseRequest,
    ) -> Result<Course> {
        self.create_course_impl(instructor_id, course).await
    }

    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(course_id).await
    }

    async fn get_course_by_code(&self, code: &str) -> Result<Option<Course>> {
        self.get_course_by_code_impl(code).await
    }

    async fn list_courses_by_instructor(&self, instructor_id: i64) -> Result<Vec<Course>> {
        self.list_courses_by_instructor_impl(instructor_id).await
    }

    async fn list_courses_by_student(&self, student_id: i64) -> Result<Vec<Course>> {
        self.list_courses_by_student_impl(student_id).await
    }

    async fn enroll_students(&self, course_id: i64, user_ids: &[i64]) -> Result<u64> {
        self.enroll_students_impl(course_id, user_ids).await
    }

    async fn is_enrolled(&self, course_id: i64, user_id: i64) -> Result<bool> {
        self.is_enrolled_impl(course_id, user_id).await
    }

    async fn list_course_students(&self, course_id: i64) -> Result<Vec<User>> {
        self.list_course_students_impl(course_id).await
    }

    // 项目模块
    async fn create_project(
        &self,
        course_id: i64,
        project: CreateProjectRequest,
    ) -> Result<Project> {
        self.create_project_impl(course_id, project).await
    }

    async fn get_project_by_id(&self, project_id: i64) -> Result<Option<Project>> {
        self.get_project_by_id_impl(project_id).await
    }

    async fn list_projects_by_course(&self, course_id: i64) -> Result<Vec<Project>> {
        self.list_projects_by_course_impl(course_id).await
    }

    async fn delete_project(&self, project_id: i64) -> Result<bool> {
        self.delete_project_impl(project_id).await
    }

    // 团队模块
    async fn create_team(
        &self,
        project_id: i64,
        instructor_id: i64,
        capacity: i32,
        team: CreateTeamRequest,
    ) -> Result<Team> {
        self.create_team_impl(project_id, instructor_id, capacity, team)
            .await
    }

    async fn get_team_by_id(&self, team_id: i64) -> Result<Option<Team>> {
        self.get_team_by_id_impl(team_id).await
    }

    async fn get_team_with_members(&self, team_id: i64) -> Result<Option<TeamWithMembers>> {
        self.get_team_with_members_impl(team_id).await
    }

    async fn list_teams_by_project(&self, project_id: i64) -> Result<Vec<TeamWithMembers>> {
        self.list_teams_by_project_impl(project_id).await
    }

    async fn list_teams_by_instructor(&self, instructor_id: i64) -> Result<Vec<TeamWithMembers>> {
        self.list_teams_by_instructor_impl(instructor_id).await
    }

    async fn update_team(&self, team_id: i64, update: UpdateTeamRequest) -> Result<Option<Team>> {
        self.update_team_impl(team_id, update).await
    }

    async fn delete_team(&self, team_id: i64) -> Result<bool> {
        self.delete_team_impl(team_id).await
    }

    async fn list_team_members(&self, team_id: i64) -> Result<Vec<User>> {
        self.list_team_members_impl(team_id).await
    }

    async fn list_available_students(&self, course_id: i64) -> Result<Vec<User>> {
        self.list_available_students_impl(course_id).await
    }

    async fn list_available_students_by_instructor(
        &self,
        instructor_id: i64,
    ) -> Result<Vec<User>> {
        self.list_available_students_by_instructor_impl(instructor_id)
            .await
    }

    // 团队成员模块
    async fn add_student_to_team(&self, team_id: i64, student_id: i64) -> Result<Vec<User>> {
        self.add_student_to_team_impl(team_id, student_id).await
    }

    async fn remove_student_from_team(&self, team_id: i64, student_id: i64) -> Result<()> {
        self.remove_student_from_team_impl(team_id, student_id)
            .await
    }

    // 互评模块
    async fn generate_team_evaluations(&self, team_id: i64) -> Result<Vec<Evaluation>> {
        self.generate_team_evaluations_impl(team_id).await
    }

    async fn get_evaluation_by_id(&self, evaluation_id: i64) -> Result<Option<Evaluation>> {
        self.get_evaluation_by_id_impl(evaluation_id).await
    }

    async fn submit_evaluation(
        &self,
        evaluation_id: i64,
        evaluator_id: i64,
        ratings: Ratings,
        comment: Option<String>,
    ) -> Result<Evaluation> {
        self.submit_evaluation_impl(evaluation_id, evaluator_id, ratings, comment)
            .await
    }

    async fn list_evaluations(
        &self,
        scope: EvaluationScope,
        status: Option<EvaluationStatus>,
    ) -> Result<Vec<Evaluation>> {
        self.list_evaluations_impl(scope, status).await
    }

    async fn list_pending_evaluations_by_project(
        &self,
        project_id: i64,
    ) -> Result<Vec<Evaluation>> {
        self.list_pending_evaluations_by_project_impl(project_id)
            .await
    }

    // 聚合统计模块
    async fn average_rating(
        &self,
        scope: EvaluationScope,
        category: RatingCategory,
    ) -> Result<Option<f64>> {
        self.average_rating_impl(scope, category).await
    }

    async fn average_ratings(&self, scope: EvaluationScope) -> Result<CategoryAverages> {
        self.average_ratings_impl(scope).await
    }

    async fn completion_counts(&self, scope: EvaluationScope) -> Result<CompletionCounts> {
        self.completion_counts_impl(scope).await
    }

    async fn per_team_breakdown(
        &self,
        instructor_id: i64,
    ) -> Result<BTreeMap<String, CategoryAverages>> {
        self.per_team_breakdown_impl(instructor_id).await
    }

    // 仪表盘模块
    async fn instructor_dashboard(&self, instructor_id: i64) -> Result<InstructorDashboard> {
        self.instructor_dashboard_impl(instructor_id).await
    }

    async fn student_dashboard(&self, student_id: i64) -> Result<StudentDashboard> {
        self.student_dashboard_impl(student_id).await
    }

    async fn student_feedback(&self, student_id: i64) -> Result<StudentFeedback> {
        self.student_feedback_impl(student_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url_infers_backend() {
        assert_eq!(
            SeaOrmStorage::build_database_url("real_ratings.db").unwrap(),
            "sqlite://real_ratings.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://localhost/ratings").unwrap(),
            "postgres://localhost/ratings"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nowhere").is_err());
    }

    #[tokio::test]
    async fn test_memory_storage_starts_empty() {
        let storage = test_support::memory_storage().await;
        assert_eq!(storage.count_users().await.unwrap(), 0);
    }
}
