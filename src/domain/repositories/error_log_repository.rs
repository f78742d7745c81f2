// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::error_log::ErrorLogEntry;
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 错误日志仓库特质
#[async_trait]
pub trait ErrorLogRepository: Send + Sync {
    /// 写入一条错误日志
    async fn create(&self, entry: &ErrorLogEntry) -> Result<(), RepositoryError>;
    /// 根据任务ID查找错误日志
    async fn find_by_task_id(&self, task_id: Uuid) -> Result<Vec<ErrorLogEntry>, RepositoryError>;
}
