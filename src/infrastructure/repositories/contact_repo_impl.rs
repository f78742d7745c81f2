// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::contact::Contact;
use crate::domain::repositories::contact_repository::ContactRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::contact as contact_entity;
use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use uuid::Uuid;

/// 联系人仓库实现
#[derive(Clone)]
pub struct ContactRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ContactRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<contact_entity::Model> for Contact {
    fn from(model: contact_entity::Model) -> Self {
        Self {
            id: model.id,
            task_id: model.task_id,
            opportunity_id: model.opportunity_id,
            user_id: model.user_id,
            name: model.name,
            job_title: model.job_title,
            profile_url: model.profile_url,
            email: model.email,
            created_at: model.created_at,
        }
    }
}

impl From<Contact> for contact_entity::ActiveModel {
    fn from(contact: Contact) -> Self {
        Self {
            id: Set(contact.id),
            task_id: Set(contact.task_id),
            opportunity_id: Set(contact.opportunity_id),
            user_id: Set(contact.user_id),
            name: Set(contact.name),
            job_title: Set(contact.job_title),
            profile_url: Set(contact.profile_url),
            email: Set(contact.email),
            created_at: Set(contact.created_at),
        }
    }
}

#[async_trait]
impl ContactRepository for ContactRepositoryImpl {
    async fn insert_many(&self, contacts: Vec<Contact>) -> Result<u64, RepositoryError> {
        if contacts.is_empty() {
            return Ok(0);
        }

        let models: Vec<contact_entity::ActiveModel> =
            contacts.into_iter().map(Into::into).collect();
        let inserted = contact_entity::Entity::insert_many(models)
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(inserted)
    }

    async fn find_by_task_id(&self, task_id: Uuid) -> Result<Vec<Contact>, RepositoryError> {
        let models = contact_entity::Entity::find()
            .filter(contact_entity::Column::TaskId.eq(task_id))
            .order_by_asc(contact_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
