use super::SeaOrmStorage;
use crate::entity::projects::{ActiveModel, Column, Entity as Projects};
use crate::entity::teams::{Column as TeamColumn, Entity as Teams};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{RatingsError, Result};
use crate::models::projects::{entities::Project, requests::CreateProjectRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, sea_query::Expr,
};

impl SeaOrmStorage {
    /// 创建项目
    pub async fn create_project_impl(
        &self,
        course_id: i64,
        req: CreateProjectRequest,
    ) -> Result<Project> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(course_id),
            title: Set(req.title),
            description: Set(req.description),
            due_date: Set(req.due_date.timestamp()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("创建项目失败: {e}")))?;

        Ok(result.into_project())
    }

    /// 通过 ID 获取项目
    pub async fn get_project_by_id_impl(&self, project_id: i64) -> Result<Option<Project>> {
        let result = Projects::find_by_id(project_id)
            .one(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询项目失败: {e}")))?;

        Ok(result.map(|m| m.into_project()))
    }

    /// 课程下的项目，按截止时间排序
    pub async fn list_projects_by_course_impl(&self, course_id: i64) -> Result<Vec<Project>> {
        let projects = Projects::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::DueDate)
            .all(&self.db)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询项目列表失败: {e}")))?;

        Ok(projects.into_iter().map(|m| m.into_project()).collect())
    }

    /// 删除项目（团队与互评级联删除）
    pub async fn delete_project_impl(&self, project_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RatingsError::database_operation(format!("开启事务失败: {e}")))?;

        let team_ids: Vec<i64> = Teams::find()
            .select_only()
            .column(TeamColumn::Id)
            .filter(TeamColumn::ProjectId.eq(project_id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("查询项目团队失败: {e}")))?;

        // users.team_id 没有外键，需要手动释放成员
        if !team_ids.is_empty() {
            Users::update_many()
                .col_expr(UserColumn::TeamId, Expr::value(Option::<i64>::None))
                .filter(UserColumn::TeamId.is_in(team_ids))
                .exec(&txn)
                .await
                .map_err(|e| RatingsError::database_operation(format!("释放团队成员失败: {e}")))?;
        }

        let result = Projects::delete_by_id(project_id)
            .exec(&txn)
            .await
            .map_err(|e| RatingsError::database_operation(format!("删除项目失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| RatingsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
