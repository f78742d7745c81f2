// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::task::{DomainError, EnrichmentTask, TaskStatus};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::infrastructure::database::entities::enrichment_task as task_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 任务仓库实现
///
/// 基于SeaORM实现的补全任务数据访问层
#[derive(Clone)]
pub struct TaskRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl TaskRepositoryImpl {
    /// 创建新的任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<task_entity::Model> for EnrichmentTask {
    fn from(model: task_entity::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            opportunity_id: model.opportunity_id,
            company_name: model.company_name,
            linkedin_url_slug: model.linkedin_url_slug,
            status: model.status.parse().unwrap_or_default(),
            error_message: model.error_message,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<EnrichmentTask> for task_entity::ActiveModel {
    fn from(task: EnrichmentTask) -> Self {
        Self {
            id: Set(task.id),
            user_id: Set(task.user_id),
            opportunity_id: Set(task.opportunity_id),
            company_name: Set(task.company_name),
            linkedin_url_slug: Set(task.linkedin_url_slug),
            status: Set(task.status.to_string()),
            error_message: Set(task.error_message),
            created_at: Set(task.created_at),
            updated_at: Set(task.updated_at),
        }
    }
}

#[async_trait]
impl TaskRepository for TaskRepositoryImpl {
    async fn create(&self, task: &EnrichmentTask) -> Result<EnrichmentTask, RepositoryError> {
        let model: task_entity::ActiveModel = task.clone().into();
        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<EnrichmentTask>, RepositoryError> {
        let model = task_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_pending_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<EnrichmentTask>, RepositoryError> {
        let models = task_entity::Entity::find()
            .filter(task_entity::Column::UserId.eq(user_id))
            .filter(task_entity::Column::Status.eq(TaskStatus::Pending.to_string()))
            .order_by_asc(task_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: TaskStatus,
        error_message: Option<String>,
    ) -> Result<(), RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let allowed_from: Vec<String> = status
            .allowed_from()
            .iter()
            .map(ToString::to_string)
            .collect();

        // Only rows in an allowed predecessor state are written.
        let result = task_entity::Entity::update_many()
            .col_expr(task_entity::Column::Status, Expr::value(status.to_string()))
            .col_expr(task_entity::Column::ErrorMessage, Expr::value(error_message))
            .col_expr(task_entity::Column::UpdatedAt, Expr::value(now))
            .filter(task_entity::Column::Id.eq(id))
            .filter(task_entity::Column::Status.is_in(allowed_from))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected > 0 {
            return Ok(());
        }

        let current = self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)?;
        current.status.transition_to(status)?;
        // The row changed between the update and the read.
        Err(DomainError::InvalidStateTransition {
            from: current.status,
            to: status,
        }
        .into())
    }
}
