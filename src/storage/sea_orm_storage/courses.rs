//! 课程与选课存储操作

use super::SeaOrmStorage;
use crate::entity::course_enrollments::{
    ActiveModel as EnrollmentActiveModel, Column as EnrollmentColumn, Entity as CourseEnrollments,
};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{RatingsError, Result};
use crate::models::courses::{entities::Course, requests::CreateCourseRequest};
use crate::models::users::entities::{User, UserRole};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(
        &self,
        instructor_id: i64,
        req: CreateCourseRequest,
    ) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            instructor_id: Set(instructor_id),
            title: Set(req.title),
            code: Set(req.code),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, course_id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 通过课程代码获取课程
    pub async fn get_course_by_code_impl(&self, code: &str) -> Result<Option<Course>> {
        let result = Courses::find()
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 教师所授课程
    pub async fn list_courses_by_instructor_impl(&self, instructor_id: i64) -> Result<Vec<Course>> {
        let courses = Courses::find()
            .filter(Column::InstructorId.eq(instructor_id))
            .order_by_asc(Column::Code)
            .all(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(courses.into_iter().map(|m| m.into_course()).collect())
    }

    /// 学生所选课程
    pub async fn list_courses_by_student_impl(&self, student_id: i64) -> Result<Vec<Course>> {
        let courses = Courses::find()
            .inner_join(CourseEnrollments)
            .filter(EnrollmentColumn::UserId.eq(student_id))
            .order_by_asc(Column::Code)
            .all(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(courses.into_iter().map(|m| m.into_course()).collect())
    }

    /// 批量选课
    pub async fn enroll_students_impl(&self, course_id: i64, user_ids: &[i64]) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RatingsError::database_operation(format!("开启事务失败: {e}")))?;

        let mut enrolled = 0u64;
        for &user_id in user_ids {
            let is_student = Users::find_by_id(user_id)
                .filter(UserColumn::Role.eq(UserRole::STUDENT))
                .count(&txn)
                .await
                .map_err(|e| RatingsError::database_operation(format!("查询用户失败: {e}")))?
                > 0;
            if !is_student {
                continue;
            }

            let already = CourseEnrollments::find()
                .filter(EnrollmentColumn::CourseId.eq(course_id))
                .filter(EnrollmentColumn::UserId.eq(user_id))
                .count(&txn)
                .await
                .map_err(|e| RatingsError::database_operation(format!("查询选课记录失败: {e}")))?
                > 0;
            if already {
                continue;
            }

            EnrollmentActiveModel {
                course_id: Set(course_id),
                user_id: Set(user_id),
                enrolled_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("选课失败: {e}")))?;
            enrolled += 1;
        }

        txn.commit()
            .await
            .map_err(|e| RatingsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(enrolled)
    }

    /// 是否已选课
    pub async fn is_enrolled_impl(&self, course_id: i64, user_id: i64) -> Result<bool> {
        let count = CourseEnrollments::find()
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .filter(EnrollmentColumn::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询选课记录失败: {e}")))?;

        Ok(count > 0)
    }

    /// 课程学生列表
    pub async fn list_course_students_impl(&self, course_id: i64) -> Result<Vec<User>> {
        let users = Users::find()
            .inner_join(CourseEnrollments)
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .filter(UserColumn::Role.eq(UserRole::STUDENT))
            .order_by_asc(UserColumn::LastName)
            .order_by_asc(UserColumn::FirstName)
            .all(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询课程学生失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_test_user, memory_storage};
    use crate::models::courses::requests::CreateCourseRequest;
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_enroll_skips_instructors_and_duplicates() {
        let storage = memory_storage().await;
        let prof = create_test_user(&storage, "prof@example.com", UserRole::Instructor).await;
        let s1 = create_test_user(&storage, "s1@example.com", UserRole::Student).await;
        let s2 = create_test_user(&storage, "s2@example.com", UserRole::Student).await;

        let course = storage
            .create_course_impl(
                prof.id,
                CreateCourseRequest {
                    title: "Software Process".to_string(),
                    code: "SOEN-341".to_string(),
                },
            )
            .await
            .unwrap();

        let first = storage
            .enroll_students_impl(course.id, &[s1.id, prof.id, 9999])
            .await
            .unwrap();
        assert_eq!(first, 1);

        let second = storage
            .enroll_students_impl(course.id, &[s1.id, s2.id])
            .await
            .unwrap();
        assert_eq!(second, 1);

        let students = storage.list_course_students_impl(course.id).await.unwrap();
        assert_eq!(students.len(), 2);
        assert!(storage.is_enrolled_impl(course.id, s2.id).await.unwrap());
        assert!(!storage.is_enrolled_impl(course.id, prof.id).await.unwrap());

        let taught = storage
            .list_courses_by_instructor_impl(prof.id)
            .await
            .unwrap();
        assert_eq!(taught.len(), 1);
        let taken = storage.list_courses_by_student_impl(s2.id).await.unwrap();
        assert_eq!(taken.first().map(|c| c.code.as_str()), Some("SOEN-341"));
    }
}
