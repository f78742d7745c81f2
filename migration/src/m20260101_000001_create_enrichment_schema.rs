use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Opportunities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Opportunities::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Opportunities::UserId).uuid().not_null())
                    .col(ColumnDef::new(Opportunities::CompanyName).string().not_null())
                    .col(ColumnDef::new(Opportunities::LinkedinUrlSlug).string())
                    .col(ColumnDef::new(Opportunities::CompanyData).json())
                    .col(ColumnDef::new(Opportunities::CompanyEnrichedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Opportunities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Opportunities::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EnrichmentTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EnrichmentTasks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EnrichmentTasks::UserId).uuid().not_null())
                    .col(ColumnDef::new(EnrichmentTasks::OpportunityId).uuid())
                    .col(ColumnDef::new(EnrichmentTasks::CompanyName).string().not_null())
                    .col(ColumnDef::new(EnrichmentTasks::LinkedinUrlSlug).string())
                    .col(
                        ColumnDef::new(EnrichmentTasks::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(EnrichmentTasks::ErrorMessage).text())
                    .col(
                        ColumnDef::new(EnrichmentTasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(EnrichmentTasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrichment_tasks_user_status")
                    .table(EnrichmentTasks::Table)
                    .col(EnrichmentTasks::UserId)
                    .col(EnrichmentTasks::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Contacts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Contacts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Contacts::TaskId).uuid().not_null())
                    .col(ColumnDef::new(Contacts::OpportunityId).uuid())
                    .col(ColumnDef::new(Contacts::UserId).uuid().not_null())
                    .col(ColumnDef::new(Contacts::Name).string().not_null())
                    .col(ColumnDef::new(Contacts::JobTitle).string())
                    .col(ColumnDef::new(Contacts::ProfileUrl).string())
                    .col(ColumnDef::new(Contacts::Email).string())
                    .col(
                        ColumnDef::new(Contacts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contacts_task_id")
                    .table(Contacts::Table)
                    .col(Contacts::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EnrichmentErrorLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EnrichmentErrorLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EnrichmentErrorLogs::TaskId).uuid())
                    .col(ColumnDef::new(EnrichmentErrorLogs::OpportunityId).uuid())
                    .col(ColumnDef::new(EnrichmentErrorLogs::Message).text().not_null())
                    .col(ColumnDef::new(EnrichmentErrorLogs::PageNumber).integer())
                    .col(
                        ColumnDef::new(EnrichmentErrorLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EnrichmentErrorLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contacts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EnrichmentTasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Opportunities::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Opportunities {
    Table,
    Id,
    UserId,
    CompanyName,
    LinkedinUrlSlug,
    CompanyData,
    CompanyEnrichedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EnrichmentTasks {
    Table,
    Id,
    UserId,
    OpportunityId,
    CompanyName,
    LinkedinUrlSlug,
    Status,
    ErrorMessage,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Contacts {
    Table,
    Id,
    TaskId,
    OpportunityId,
    UserId,
    Name,
    JobTitle,
    ProfileUrl,
    Email,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EnrichmentErrorLogs {
    Table,
    Id,
    TaskId,
    OpportunityId,
    Message,
    PageNumber,
    CreatedAt,
}
