// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::opportunity::Opportunity;
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 机会仓库特质
///
/// 只暴露公司主页补全流程需要的读写操作
#[async_trait]
pub trait OpportunityRepository: Send + Sync {
    /// 根据ID查找机会
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Opportunity>, RepositoryError>;
    /// 保存公司主页数据并记录补全时间
    async fn update_company_data(
        &self,
        id: Uuid,
        data: serde_json::Value,
    ) -> Result<(), RepositoryError>;
    /// 保存匹配到的公司标识
    async fn update_slug(&self, id: Uuid, slug: &str) -> Result<(), RepositoryError>;
}
