use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// DDL for the trigger function that keeps `storage_usage` in step with
/// `stored_file`. Counters move inside the same transaction as the row
/// insert or delete, so a usage read never sees a half-applied upload.
const USAGE_SYNC_FUNCTION: &str = r#"
CREATE OR REPLACE FUNCTION stored_file_usage_sync() RETURNS trigger AS $$
BEGIN
    IF TG_OP = 'INSERT' THEN
        INSERT INTO storage_usage
            (account_id, total_bytes, photo_bytes, report_bytes, file_count, calculated_at)
        VALUES (
            NEW.account_id,
            NEW.size_bytes,
            CASE WHEN NEW.category = 'photo' THEN NEW.size_bytes ELSE 0 END,
            CASE WHEN NEW.category = 'report' THEN NEW.size_bytes ELSE 0 END,
            1,
            now()
        )
        ON CONFLICT (account_id) DO UPDATE SET
            total_bytes = storage_usage.total_bytes + NEW.size_bytes,
            photo_bytes = storage_usage.photo_bytes
                + CASE WHEN NEW.category = 'photo' THEN NEW.size_bytes ELSE 0 END,
            report_bytes = storage_usage.report_bytes
                + CASE WHEN NEW.category = 'report' THEN NEW.size_bytes ELSE 0 END,
            file_count = storage_usage.file_count + 1,
            calculated_at = now();
        RETURN NEW;
    ELSIF TG_OP = 'DELETE' THEN
        UPDATE storage_usage SET
            total_bytes = GREATEST(total_bytes - OLD.size_bytes, 0),
            photo_bytes = GREATEST(photo_bytes
                - CASE WHEN OLD.category = 'photo' THEN OLD.size_bytes ELSE 0 END, 0),
            report_bytes = GREATEST(report_bytes
                - CASE WHEN OLD.category = 'report' THEN OLD.size_bytes ELSE 0 END, 0),
            file_count = GREATEST(file_count - 1, 0),
            calculated_at = now()
        WHERE account_id = OLD.account_id;
        RETURN OLD;
    END IF;
    RETURN NULL;
END;
$$ LANGUAGE plpgsql;
"#;

const USAGE_TRIGGER_STATEMENTS: &[&str] = &[
    "DROP TRIGGER IF EXISTS stored_file_usage_insert ON stored_file",
    "CREATE TRIGGER stored_file_usage_insert AFTER INSERT ON stored_file \
     FOR EACH ROW EXECUTE FUNCTION stored_file_usage_sync()",
    "DROP TRIGGER IF EXISTS stored_file_usage_delete ON stored_file",
    "CREATE TRIGGER stored_file_usage_delete AFTER DELETE ON stored_file \
     FOR EACH ROW EXECUTE FUNCTION stored_file_usage_sync()",
];

/// Install the triggers that maintain the `storage_usage` counters.
///
/// SeaORM's schema-sync covers tables but not plpgsql functions or
/// triggers, so we apply the DDL manually on startup.
pub async fn ensure_usage_triggers(db: &DatabaseConnection) -> Result<(), DbErr> {
    let result = db.execute_unprepared(USAGE_SYNC_FUNCTION).await;
    match result {
        Ok(_) => {
            info!("Ensured function stored_file_usage_sync exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create function stored_file_usage_sync: {}", e);
            return Ok(());
        }
    }

    for stmt in USAGE_TRIGGER_STATEMENTS {
        if let Err(e) = db.execute_unprepared(stmt).await {
            tracing::warn!("Failed to apply trigger DDL: {}", e);
            return Ok(());
        }
    }

    info!("Ensured storage usage triggers exist");
    Ok(())
}
