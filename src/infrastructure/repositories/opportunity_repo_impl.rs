// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::opportunity::Opportunity;
use crate::domain::repositories::opportunity_repository::OpportunityRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::opportunity as opportunity_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;
use uuid::Uuid;

/// 机会仓库实现
#[derive(Clone)]
pub struct OpportunityRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl OpportunityRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> Result<opportunity_entity::Model, RepositoryError> {
        opportunity_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

impl From<opportunity_entity::Model> for Opportunity {
    fn from(model: opportunity_entity::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            company_name: model.company_name,
            linkedin_url_slug: model.linkedin_url_slug,
            company_data: model.company_data,
            company_enriched_at: model.company_enriched_at,
        }
    }
}

#[async_trait]
impl OpportunityRepository for OpportunityRepositoryImpl {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Opportunity>, RepositoryError> {
        let model = opportunity_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn update_company_data(
        &self,
        id: Uuid,
        data: serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let mut model: opportunity_entity::ActiveModel = self.find_model(id).await?.into();
        model.company_data = Set(Some(data));
        model.company_enriched_at = Set(Some(now));
        model.updated_at = Set(now);
        model.update(self.db.as_ref()).await?;
        Ok(())
    }

    async fn update_slug(&self, id: Uuid, slug: &str) -> Result<(), RepositoryError> {
        let mut model: opportunity_entity::ActiveModel = self.find_model(id).await?.into();
        model.linkedin_url_slug = Set(Some(slug.to_string()));
        model.updated_at = Set(Utc::now().into());
        model.update(self.db.as_ref()).await?;
        Ok(())
    }
}
