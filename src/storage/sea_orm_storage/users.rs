use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{RatingsError, Result};
use crate::models::users::{entities::User, requests::CreateUserRequest};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            email: Set(req.email),
            password_hash: Set(req.password),
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            role: Set(req.role.to_string()),
            student_number: Set(req.student_number),
            team_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("创建用户失败: {e}")))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 统计用户数量
    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("统计用户数量失败: {e}")))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_test_user, memory_storage};
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let storage = memory_storage().await;
        let user = create_test_user(&storage, "amy@example.com", UserRole::Student).await;

        let by_id = storage.get_user_by_id_impl(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "amy@example.com");
        assert_eq!(by_id.role, UserRole::Student);
        assert!(by_id.team_id.is_none());

        let by_email = storage
            .get_user_by_email_impl("amy@example.com")
            .await
            .unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));
        assert_eq!(storage.count_users_impl().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let storage = memory_storage().await;
        create_test_user(&storage, "dup@example.com", UserRole::Student).await;

        let err = storage
            .create_user_impl(crate::models::users::requests::CreateUserRequest {
                email: "dup@example.com".to_string(),
                password: "hashed".to_string(),
                first_name: "Dup".to_string(),
                last_name: "User".to_string(),
                role: UserRole::Student,
                student_number: None,
            })
            .await;
        assert!(err.is_err());
    }
}
