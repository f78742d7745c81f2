use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 任务插入通知频道，需与 `realtime.channel` 配置保持一致
const CHANNEL: &str = "enrichment_tasks_changes";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // LISTEN/NOTIFY only exists on Postgres; sqlite test databases skip it.
        if manager.get_database_backend() != DbBackend::Postgres {
            return Ok(());
        }

        let db = manager.get_connection();

        db.execute_unprepared(&format!(
            r#"
            CREATE OR REPLACE FUNCTION notify_enrichment_task_insert() RETURNS trigger AS $$
            BEGIN
                PERFORM pg_notify(
                    '{CHANNEL}',
                    json_build_object(
                        'type', TG_OP,
                        'table', TG_TABLE_NAME,
                        'new', row_to_json(NEW)
                    )::text
                );
                RETURN NEW;
            END;
            $$ LANGUAGE plpgsql;
            "#
        ))
        .await?;

        db.execute_unprepared(
            r#"
            DROP TRIGGER IF EXISTS enrichment_tasks_insert_notify ON enrichment_tasks;
            CREATE TRIGGER enrichment_tasks_insert_notify
                AFTER INSERT ON enrichment_tasks
                FOR EACH ROW EXECUTE FUNCTION notify_enrichment_task_insert();
            "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::Postgres {
            return Ok(());
        }

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS enrichment_tasks_insert_notify ON enrichment_tasks;
                DROP FUNCTION IF EXISTS notify_enrichment_task_insert();
                "#,
            )
            .await?;

        Ok(())
    }
}
