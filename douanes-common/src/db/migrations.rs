//! Database schema migrations
//!
//! Versioned, idempotent schema changes applied on every start. Stores
//! created by older releases are upgraded in place; nothing is dropped.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations**: stores upgrading from older releases depend on them
//! 2. **Always add new migrations**: one function per schema change
//! 3. **Check before altering**: every step must be a no-op when already applied
//! 4. **Use ALTER TABLE**: prefer it over DROP/CREATE to preserve data
//!
//! Data backfills that must run on every start (such as the affiliation
//! links) live next to their domain logic, not here.

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    if !table_exists(pool, "schema_version").await? {
        return Ok(0);
    }

    let version: Option<i32> = sqlx::query_scalar(
        "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1"
    )
    .fetch_optional(pool)
    .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name=?
        )
        "#
    )
    .bind(table)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

async fn column_exists(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?"
    )
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        warn!("This may indicate a downgrade. Proceeding with caution.");
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    info!("All migrations completed successfully");
    Ok(())
}

/// Migration v1: add the normalized `order_id` link to brigands
///
/// **Background:** brigands first carried their affiliation as free text
/// in `"order"`. The link column is added alongside it; the legacy text
/// stays for audit and is resolved by the affiliation backfill.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Add order_id column to brigands");

    if !table_exists(pool, "brigands").await? {
        info!("  Brigands table doesn't exist yet - skipping migration");
        return Ok(());
    }

    if column_exists(pool, "brigands", "order_id").await? {
        info!("  order_id column already exists - skipping");
        return Ok(());
    }

    // Catch duplicate column error for concurrent initialization race conditions
    match sqlx::query("ALTER TABLE brigands ADD COLUMN order_id INTEGER NULL REFERENCES organisations(id)")
        .execute(pool)
        .await
    {
        Ok(_) => {
            info!("  ✓ Added order_id column to brigands table");
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
            info!("  order_id column added by concurrent initialization - skipping");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Migration v2: lookup indexes for the roster
///
/// Name search and the "who points at this organisation" scan on delete.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Brigand lookup indexes");

    if !table_exists(pool, "brigands").await? {
        info!("  Brigands table doesn't exist yet - skipping migration");
        return Ok(());
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_brigands_name ON brigands(name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_brigands_order_id ON brigands(order_id)")
        .execute(pool)
        .await?;

    info!("  ✓ Brigand indexes present");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    async fn create_schema_version(pool: &SqlitePool) {
        sqlx::query(
            "CREATE TABLE schema_version (version INTEGER PRIMARY KEY, applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP)"
        )
        .execute(pool)
        .await
        .unwrap();
    }

    async fn create_legacy_brigands(pool: &SqlitePool) {
        sqlx::query(
            r#"
            CREATE TABLE brigands (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                list TEXT DEFAULT '',
                facts TEXT DEFAULT '',
                is_crown INTEGER NOT NULL DEFAULT 0,
                is_png INTEGER NOT NULL DEFAULT 0,
                "order" TEXT DEFAULT ''
            )
            "#
        )
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_get_schema_version_no_table() {
        let pool = setup_test_db().await;
        assert_eq!(get_schema_version(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_and_get_schema_version() {
        let pool = setup_test_db().await;
        create_schema_version(&pool).await;

        set_schema_version(&pool, 1).await.unwrap();
        assert_eq!(get_schema_version(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_migrate_v1_no_table() {
        let pool = setup_test_db().await;
        migrate_v1(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_migrate_v1_adds_column_and_keeps_legacy_text() {
        let pool = setup_test_db().await;
        create_legacy_brigands(&pool).await;
        sqlx::query(r#"INSERT INTO brigands (name, "order") VALUES ('Gaston', 'AC12')"#)
            .execute(&pool)
            .await
            .unwrap();

        migrate_v1(&pool).await.unwrap();

        assert!(column_exists(&pool, "brigands", "order_id").await.unwrap());
        let legacy: String = sqlx::query_scalar(r#"SELECT "order" FROM brigands WHERE name = 'Gaston'"#)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(legacy, "AC12");
    }

    #[tokio::test]
    async fn test_migrate_v1_idempotent() {
        let pool = setup_test_db().await;
        create_legacy_brigands(&pool).await;

        migrate_v1(&pool).await.unwrap();
        migrate_v1(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('brigands') WHERE name = 'order_id'"
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_run_migrations_complete_flow() {
        let pool = setup_test_db().await;
        create_schema_version(&pool).await;
        create_legacy_brigands(&pool).await;

        run_migrations(&pool).await.unwrap();
        assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);

        // Second run finds nothing to do
        run_migrations(&pool).await.unwrap();
        assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);
    }
}
