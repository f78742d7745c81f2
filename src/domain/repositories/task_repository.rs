// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{DomainError, EnrichmentTask, TaskStatus};
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 记录当前状态不允许本次写入
    #[error(transparent)]
    Conflict(#[from] DomainError),
}

/// 任务仓库特质
///
/// 定义补全任务数据访问接口。本系统只更新任务状态，不删除任务
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 创建新任务
    async fn create(&self, task: &EnrichmentTask) -> Result<EnrichmentTask, RepositoryError>;
    /// 根据ID查找任务
    async fn find_by_id(&self, id: Uuid) -> Result<Option<EnrichmentTask>, RepositoryError>;
    /// 查找用户所有待处理任务，按创建时间升序
    async fn find_pending_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<EnrichmentTask>, RepositoryError>;
    /// 更新任务状态和错误信息
    ///
    /// 只有当前状态在 `status.allowed_from()` 之内时才写入，终态不会被覆盖
    /// # 参数
    ///
    /// * `id` - 任务ID
    /// * `status` - 新状态
    /// * `error_message` - 失败原因，成功状态传 `None`
    ///
    /// # 返回值
    ///
    /// * `Err(RepositoryError::NotFound)` - 任务不存在
    /// * `Err(RepositoryError::Conflict)` - 当前状态不允许转换
    async fn update_status(
        &self,
        id: Uuid,
        status: TaskStatus,
        error_message: Option<String>,
    ) -> Result<(), RepositoryError>;
}
