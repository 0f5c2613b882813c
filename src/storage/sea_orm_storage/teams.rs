//! 团队与团队成员存储操作
//!
//! 成员关系保存在 `users.team_id` 上，一个学生同一时间最多属于一个团队。
//! 加入团队时的容量检查与分配在同一事务内完成，事务第一条语句先写团队行，
//! 在 PostgreSQL/MySQL 上即行锁，在 SQLite 上即数据库写锁，
//! 并发的加入请求因此会串行化，团队人数不会超过容量。

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::course_enrollments::{
    Column as EnrollmentColumn, Entity as CourseEnrollments, Relation as EnrollmentRelation,
};
use crate::entity::courses::Column as CourseColumn;
use crate::entity::teams::{ActiveModel, Column, Entity as Teams, Model as TeamModel};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{RatingsError, Result};
use crate::models::teams::{
    entities::{Team, TeamWithMembers},
    requests::{CreateTeamRequest, UpdateTeamRequest},
};
use crate::models::users::entities::{User, UserRole};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait, sea_query::Expr,
};

impl SeaOrmStorage {
    /// 创建团队
    pub async fn create_team_impl(
        &self,
        project_id: i64,
        instructor_id: i64,
        capacity: i32,
        req: CreateTeamRequest,
    ) -> Result<Team> {
        let now = chrono::Utc::now().timestamp();

        if Self::team_name_taken(&self.db, project_id, &req.name, None).await? {
            return Err(RatingsError::conflict(format!(
                "A team named '{}' already exists in this project",
                req.name
            )));
        }

        let model = ActiveModel {
            project_id: Set(project_id),
            instructor_id: Set(instructor_id),
            name: Set(req.name),
            description: Set(req.description),
            capacity: Set(capacity),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("创建团队失败: {e}")))?;

        Ok(result.into_team())
    }

    /// 通过 ID 获取团队
    pub async fn get_team_by_id_impl(&self, team_id: i64) -> Result<Option<Team>> {
        let result = Teams::find_by_id(team_id)
            .one(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询团队失败: {e}")))?;

        Ok(result.map(|m| m.into_team()))
    }

    /// 获取团队及其成员
    pub async fn get_team_with_members_impl(
        &self,
        team_id: i64,
    ) -> Result<Option<TeamWithMembers>> {
        let team = Teams::find_by_id(team_id)
            .one(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询团队失败: {e}")))?;

        match team {
            Some(team) => Ok(Self::attach_members(&self.db, vec![team]).await?.pop()),
            None => Ok(None),
        }
    }

    /// 项目下的团队
    pub async fn list_teams_by_project_impl(&self, project_id: i64) -> Result<Vec<TeamWithMembers>> {
        let teams = Teams::find()
            .filter(Column::ProjectId.eq(project_id))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询团队列表失败: {e}")))?;

        Self::attach_members(&self.db, teams).await
    }

    /// 教师负责的团队
    pub async fn list_teams_by_instructor_impl(
        &self,
        instructor_id: i64,
    ) -> Result<Vec<TeamWithMembers>> {
        let teams = Teams::find()
            .filter(Column::InstructorId.eq(instructor_id))
            .order_by_asc(Column::ProjectId)
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询团队列表失败: {e}")))?;

        Self::attach_members(&self.db, teams).await
    }

    /// 更新团队信息
    pub async fn update_team_impl(
        &self,
        team_id: i64,
        update: UpdateTeamRequest,
    ) -> Result<Option<Team>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RatingsError::database_operation(format!("开启事务失败: {e}")))?;

        let Some(existing) = Teams::find_by_id(team_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询团队失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model = ActiveModel {
            id: Set(team_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(name) = update.name {
            if name != existing.name
                && Self::team_name_taken(&txn, existing.project_id, &name, Some(team_id)).await?
            {
                return Err(RatingsError::conflict(format!(
                    "A team named '{name}' already exists in this project"
                )));
            }
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(capacity) = update.capacity {
            let members = Self::count_members_on(&txn, team_id).await?;
            if (capacity as i64) < members as i64 {
                return Err(RatingsError::validation(format!(
                    "Capacity {capacity} is lower than the current member count {members}"
                )));
            }
            model.capacity = Set(capacity);
        }

        let result = model
            .update(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("更新团队失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| RatingsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(result.into_team()))
    }

    /// 删除团队（互评级联删除，成员引用在同一事务中清空）
    pub async fn delete_team_impl(&self, team_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RatingsError::database_operation(format!("开启事务失败: {e}")))?;

        Users::update_many()
            .col_expr(UserColumn::TeamId, Expr::value(Option::<i64>::None))
            .filter(UserColumn::TeamId.eq(team_id))
            .exec(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("释放团队成员失败: {e}")))?;

        let result = Teams::delete_by_id(team_id)
            .exec(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("删除团队失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| RatingsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 团队成员列表
    pub async fn list_team_members_impl(&self, team_id: i64) -> Result<Vec<User>> {
        Self::members_on(&self.db, team_id).await
    }

    /// 选了该课程且尚未分组的学生
    pub async fn list_available_students_impl(&self, course_id: i64) -> Result<Vec<User>> {
        let users = Users::find()
            .inner_join(CourseEnrollments)
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .filter(UserColumn::Role.eq(UserRole::STUDENT))
            .filter(UserColumn::TeamId.is_null())
            .order_by_asc(UserColumn::LastName)
            .order_by_asc(UserColumn::FirstName)
            .all(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询可分配学生失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    /// 选了该教师任一课程且尚未分组的学生
    pub async fn list_available_students_by_instructor_impl(
        &self,
        instructor_id: i64,
    ) -> Result<Vec<User>> {
        let users = Users::find()
            .inner_join(CourseEnrollments)
            .join(JoinType::InnerJoin, EnrollmentRelation::Course.def())
            .filter(CourseColumn::InstructorId.eq(instructor_id))
            .filter(UserColumn::Role.eq(UserRole::STUDENT))
            .filter(UserColumn::TeamId.is_null())
            .distinct()
            .order_by_asc(UserColumn::LastName)
            .order_by_asc(UserColumn::FirstName)
            .all(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询可分配学生失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    /// 将学生加入团队
    pub async fn add_student_to_team_impl(
        &self,
        team_id: i64,
        student_id: i64,
    ) -> Result<Vec<User>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RatingsError::database_operation(format!("开启事务失败: {e}")))?;

        // 先写团队行以取得锁，之后的计数与分配都在锁内
        let touched = Teams::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(team_id))
            .exec(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("锁定团队失败: {e}")))?;
        if touched.rows_affected == 0 {
            return Err(RatingsError::not_found(format!("Team {team_id} not found")));
        }

        let team = Teams::find_by_id(team_id)
            .one(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询团队失败: {e}")))?
            .ok_or_else(|| RatingsError::not_found(format!("Team {team_id} not found")))?;

        let student = Users::find_by_id(student_id)
            .one(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询用户失败: {e}")))?
            .ok_or_else(|| RatingsError::not_found(format!("Student {student_id} not found")))?;

        if student.role != UserRole::STUDENT {
            return Err(RatingsError::validation(format!(
                "User {student_id} is not a student"
            )));
        }

        match student.team_id {
            // 已在本团队，最终状态一致，直接返回
            Some(current) if current == team_id => {
                let members = Self::members_on(&txn, team_id).await?;
                txn.commit().await.map_err(|e| {
                    RatingsError::database_operation(format!("提交事务失败: {e}"))
                })?;
                return Ok(members);
            }
            Some(current) => {
                return Err(RatingsError::already_assigned(format!(
                    "Student {student_id} already belongs to team {current}"
                )));
            }
            None => {}
        }

        let members = Self::count_members_on(&txn, team_id).await?;
        if members >= team.capacity.max(0) as u64 {
            return Err(RatingsError::capacity_exceeded(format!(
                "Team '{}' is full ({}/{})",
                team.name, members, team.capacity
            )));
        }

        // 仅当学生仍未分组时才写入
        let assigned = Users::update_many()
            .col_expr(UserColumn::TeamId, Expr::value(Some(team_id)))
            .col_expr(UserColumn::UpdatedAt, Expr::value(now))
            .filter(UserColumn::Id.eq(student_id))
            .filter(UserColumn::TeamId.is_null())
            .exec(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("分配团队失败: {e}")))?;
        if assigned.rows_affected == 0 {
            return Err(RatingsError::already_assigned(format!(
                "Student {student_id} already belongs to another team"
            )));
        }

        let updated = Self::members_on(&txn, team_id).await?;

        txn.commit()
            .await
            .map_err(|e| RatingsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(updated)
    }

    /// 将学生移出团队
    pub async fn remove_student_from_team_impl(&self, team_id: i64, student_id: i64) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        let exists = Teams::find_by_id(team_id)
            .count(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询团队失败: {e}")))?
            > 0;
        if !exists {
            return Err(RatingsError::not_found(format!("Team {team_id} not found")));
        }

        let result = Users::update_many()
            .col_expr(UserColumn::TeamId, Expr::value(Option::<i64>::None))
            .col_expr(UserColumn::UpdatedAt, Expr::value(now))
            .filter(UserColumn::Id.eq(student_id))
            .filter(UserColumn::TeamId.eq(team_id))
            .exec(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("移出团队失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(RatingsError::not_a_member(format!(
                "Student {student_id} is not a member of team {team_id}"
            )));
        }

        Ok(())
    }

    pub(super) async fn members_on<C: ConnectionTrait>(conn: &C, team_id: i64) -> Result<Vec<User>> {
        let users = Users::find()
            .filter(UserColumn::TeamId.eq(team_id))
            .order_by_asc(UserColumn::LastName)
            .order_by_asc(UserColumn::FirstName)
            .all(conn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询团队成员失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    async fn count_members_on<C: ConnectionTrait>(conn: &C, team_id: i64) -> Result<u64> {
        Users::find()
            .filter(UserColumn::TeamId.eq(team_id))
            .count(conn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("统计团队成员失败: {e}")))
    }

    async fn team_name_taken<C: ConnectionTrait>(
        conn: &C,
        project_id: i64,
        name: &str,
        exclude: Option<i64>,
    ) -> Result<bool> {
        let mut select = Teams::find()
            .filter(Column::ProjectId.eq(project_id))
            .filter(Column::Name.eq(name));
        if let Some(id) = exclude {
            select = select.filter(Column::Id.ne(id));
        }

        let count = select
            .count(conn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询团队失败: {e}")))?;

        Ok(count > 0)
    }

    /// 一次查询取出所有团队的成员
    pub(super) async fn attach_members<C: ConnectionTrait>(
        conn: &C,
        teams: Vec<TeamModel>,
    ) -> Result<Vec<TeamWithMembers>> {
        if teams.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = teams.iter().map(|t| t.id).collect();
        let users = Users::find()
            .filter(UserColumn::TeamId.is_in(ids))
            .order_by_asc(UserColumn::LastName)
            .order_by_asc(UserColumn::FirstName)
            .all(conn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询团队成员失败: {e}")))?;

        let mut by_team: HashMap<i64, Vec<User>> = HashMap::new();
        for user in users {
            if let Some(team_id) = user.team_id {
                by_team.entry(team_id).or_default().push(user.into_user());
            }
        }

        Ok(teams
            .into_iter()
            .map(|team| {
                let members = by_team.remove(&team.id).unwrap_or_default();
                TeamWithMembers {
                    team: team.into_team(),
                    members,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::SeaOrmStorage;
    use super::super::test_support::{
        create_test_user, file_storage, memory_storage, remove_file_storage,
    };
    use crate::errors::RatingsError;
    use crate::models::courses::requests::CreateCourseRequest;
    use crate::models::projects::requests::CreateProjectRequest;
    use crate::models::teams::entities::Team;
    use crate::models::teams::requests::{CreateTeamRequest, UpdateTeamRequest};
    use crate::models::users::entities::{User, UserRole};

    struct Fixture {
        storage: SeaOrmStorage,
        instructor: User,
        course_id: i64,
        project_id: i64,
    }

    async fn fixture() -> Fixture {
        fixture_on(memory_storage().await).await
    }

    async fn fixture_on(storage: SeaOrmStorage) -> Fixture {
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
                    description: None,
                    due_date: chrono::Utc::now(),
                },
            )
            .await
            .unwrap();
        Fixture {
            storage,
            instructor,
            course_id: course.id,
            project_id: project.id,
        }
    }

    async fn team(f: &Fixture, name: &str, capacity: i32) -> Team {
        f.storage
            .create_team_impl(
                f.project_id,
                f.instructor.id,
                capacity,
                CreateTeamRequest {
                    name: name.to_string(),
                    description: None,
                    capacity: None,
                },
            )
            .await
            .unwrap()
    }

    async fn students(f: &Fixture, n: usize) -> Vec<User> {
        let mut out = Vec::new();
        for i in 0..n {
            out.push(create_test_user(&f.storage, &format!("s{i}@example.com"), UserRole::Student).await);
        }
        out
    }

    #[tokio::test]
    async fn test_sixth_student_exceeds_capacity_of_five() {
        let f = fixture().await;
        let t = team(&f, "Team A", 5).await;
        let s = students(&f, 6).await;

        for student in &s[..5] {
            f.storage.add_student_to_team_impl(t.id, student.id).await.unwrap();
        }

        let err = f
            .storage
            .add_student_to_team_impl(t.id, s[5].id)
            .await
            .unwrap_err();
        assert!(matches!(err, RatingsError::CapacityExceeded(_)));

        let members = f.storage.list_team_members_impl(t.id).await.unwrap();
        assert_eq!(members.len(), 5);
        let sixth = f.storage.get_user_by_id_impl(s[5].id).await.unwrap().unwrap();
        assert!(sixth.team_id.is_none());
    }

    #[tokio::test]
    async fn test_already_assigned_leaves_both_teams_unchanged() {
        let f = fixture().await;
        let a = team(&f, "Team A", 5).await;
        let b = team(&f, "Team B", 5).await;
        let s = students(&f, 2).await;

        f.storage.add_student_to_team_impl(a.id, s[0].id).await.unwrap();
        f.storage.add_student_to_team_impl(b.id, s[1].id).await.unwrap();

        let err = f
            .storage
            .add_student_to_team_impl(b.id, s[0].id)
            .await
            .unwrap_err();
        assert!(matches!(err, RatingsError::AlreadyAssigned(_)));

        let a_members: Vec<i64> = f
            .storage
            .list_team_members_impl(a.id)
            .await
            .unwrap()
            .iter()
            .map(|u| u.id)
            .collect();
        let b_members: Vec<i64> = f
            .storage
            .list_team_members_impl(b.id)
            .await
            .unwrap()
            .iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(a_members, vec![s[0].id]);
        assert_eq!(b_members, vec![s[1].id]);
    }

    #[tokio::test]
    async fn test_adding_existing_member_is_a_no_op() {
        let f = fixture().await;
        let t = team(&f, "Team A", 2).await;
        let s = students(&f, 1).await;

        f.storage.add_student_to_team_impl(t.id, s[0].id).await.unwrap();
        let members = f.storage.add_student_to_team_impl(t.id, s[0].id).await.unwrap();
        assert_eq!(members.len(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_instructor_and_unknown_team() {
        let f = fixture().await;
        let t = team(&f, "Team A", 2).await;

        let err = f
            .storage
            .add_student_to_team_impl(t.id, f.instructor.id)
            .await
            .unwrap_err();
        assert!(matches!(err, RatingsError::Validation(_)));

        let s = students(&f, 1).await;
        let err = f
            .storage
            .add_student_to_team_impl(t.id + 100, s[0].id)
            .await
            .unwrap_err();
        assert!(matches!(err, RatingsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_member_and_not_a_member() {
        let f = fixture().await;
        let t = team(&f, "Team A", 3).await;
        let s = students(&f, 2).await;

        f.storage.add_student_to_team_impl(t.id, s[0].id).await.unwrap();
        f.storage
            .remove_student_from_team_impl(t.id, s[0].id)
            .await
            .unwrap();
        assert!(f.storage.list_team_members_impl(t.id).await.unwrap().is_empty());

        let err = f
            .storage
            .remove_student_from_team_impl(t.id, s[1].id)
            .await
            .unwrap_err();
        assert!(matches!(err, RatingsError::NotAMember(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_never_exceed_capacity() {
        // 多连接池下事务真正并行，容量检查与分配必须是一个原子单元
        let (storage, path) = file_storage("concurrent_adds", 8).await;
        let f = fixture_on(storage).await;
        let t = team(&f, "Team A", 2).await;
        let s = students(&f, 8).await;

        let handles: Vec<_> = s
            .iter()
            .map(|student| {
                let storage = f.storage.clone();
                let (team_id, student_id) = (t.id, student.id);
                tokio::spawn(async move {
                    storage.add_student_to_team_impl(team_id, student_id).await
                })
            })
            .collect();

        let mut ok = 0;
        let mut full = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(RatingsError::CapacityExceeded(_)) => full += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        let members = f.storage.list_team_members_impl(t.id).await.unwrap();
        remove_file_storage(&path);
        assert_eq!(ok, 2);
        assert_eq!(full, 6);
        assert_eq!(members.len(), 2);
    }

    #[tokio::test]
    async fn test_capacity_cannot_drop_below_members_and_delete_releases() {
        let f = fixture().await;
        let t = team(&f, "Team A", 3).await;
        let s = students(&f, 2).await;
        for student in &s {
            f.storage.add_student_to_team_impl(t.id, student.id).await.unwrap();
        }

        let err = f
            .storage
            .update_team_impl(
                t.id,
                UpdateTeamRequest {
                    capacity: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RatingsError::Validation(_)));

        assert!(f.storage.delete_team_impl(t.id).await.unwrap());
        let released = f.storage.get_user_by_id_impl(s[0].id).await.unwrap().unwrap();
        assert!(released.team_id.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_team_name_conflicts() {
        let f = fixture().await;
        team(&f, "Team A", 3).await;
        let err = f
            .storage
            .create_team_impl(
                f.project_id,
                f.instructor.id,
                3,
                CreateTeamRequest {
                    name: "Team A".to_string(),
                    description: None,
                    capacity: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RatingsError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_available_students_excludes_assigned() {
        let f = fixture().await;
        let t = team(&f, "Team A", 3).await;
        let s = students(&f, 3).await;
        let ids: Vec<i64> = s.iter().map(|u| u.id).collect();
        f.storage.enroll_students_impl(f.course_id, &ids).await.unwrap();
        f.storage.add_student_to_team_impl(t.id, s[0].id).await.unwrap();

        let available = f
            .storage
            .list_available_students_impl(f.course_id)
            .await
            .unwrap();
        assert_eq!(available.len(), 2);
        assert!(available.iter().all(|u| u.id != s[0].id));

        let by_instructor = f
            .storage
            .list_available_students_by_instructor_impl(f.instructor.id)
            .await
            .unwrap();
        assert_eq!(by_instructor.len(), 2);
    }
}
