// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "contacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub task_id: Uuid,
    pub opportunity_id: Option<Uuid>,
    pub user_id: Uuid,
    pub name: String,
    pub job_title: Option<String>,
    pub profile_url: Option<String>,
    pub email: Option<String>,
    pub created_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::enrichment_task::Entity",
        from = "Column::TaskId",
        to = "super::enrichment_task::Column::Id"
    )]
    EnrichmentTask,
}

impl Related<super::enrichment_task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EnrichmentTask.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
