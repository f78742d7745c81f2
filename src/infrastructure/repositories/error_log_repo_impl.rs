// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::error_log::ErrorLogEntry;
use crate::domain::repositories::error_log_repository::ErrorLogRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::enrichment_error_log as log_entity;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 错误日志仓库实现
#[derive(Clone)]
pub struct ErrorLogRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ErrorLogRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<log_entity::Model> for ErrorLogEntry {
    fn from(model: log_entity::Model) -> Self {
        Self {
            id: model.id,
            task_id: model.task_id,
            opportunity_id: model.opportunity_id,
            message: model.message,
            page_number: model.page_number,
            created_at: model.created_at,
        }
    }
}

#[async_trait]
impl ErrorLogRepository for ErrorLogRepositoryImpl {
    async fn create(&self, entry: &ErrorLogEntry) -> Result<(), RepositoryError> {
        let model = log_entity::ActiveModel {
            id: Set(entry.id),
            task_id: Set(entry.task_id),
            opportunity_id: Set(entry.opportunity_id),
            message: Set(entry.message.clone()),
            page_number: Set(entry.page_number),
            created_at: Set(entry.created_at),
        };
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn find_by_task_id(&self, task_id: Uuid) -> Result<Vec<ErrorLogEntry>, RepositoryError> {
        let models = log_entity::Entity::find()
            .filter(log_entity::Column::TaskId.eq(task_id))
            .order_by_asc(log_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
