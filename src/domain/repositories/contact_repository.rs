// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::contact::Contact;
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 联系人仓库特质
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// 批量插入联系人，返回插入条数
    async fn insert_many(&self, contacts: Vec<Contact>) -> Result<u64, RepositoryError>;
    /// 根据任务ID查找联系人
    async fn find_by_task_id(&self, task_id: Uuid) -> Result<Vec<Contact>, RepositoryError>;
}
