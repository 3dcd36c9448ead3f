//! Database initialization
//!
//! Startup sequence:
//! 1. open (or create) the SQLite file
//! 2. create missing tables
//! 3. run versioned schema migrations
//! 4. backfill normalized affiliation links
//!
//! Every step is idempotent, so this runs on each start before the
//! service accepts traffic.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open the database at `db_path`, creating and migrating it as needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets the status board read while a report is being written
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    prepare_schema(&pool).await?;

    Ok(pool)
}

/// Create tables, migrate and backfill on an already-open pool
///
/// Split from [`init_database`] so in-memory pools go through the same path.
pub async fn prepare_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    create_schema_version_table(pool).await?;
    create_villages_table(pool).await?;
    create_reports_table(pool).await?;
    create_organisations_table(pool).await?;
    create_brigands_table(pool).await?;

    crate::db::migrations::run_migrations(pool).await?;

    let migrated = crate::affiliation::migrate_legacy_affiliations(pool).await?;
    if migrated > 0 {
        info!("Linked {} brigand(s) to their organisation", migrated);
    }

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_villages_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS villages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the reports table
///
/// No uniqueness on (village, report_date): a village may be reported
/// twice in one day and supervisors sort it out.
async fn create_reports_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            report_date DATE,
            user_id INTEGER,
            village TEXT NOT NULL,
            tour_de_garde INTEGER NOT NULL DEFAULT 1,
            mem_visions TEXT NOT NULL DEFAULT '',
            surveillance TEXT NOT NULL DEFAULT '',
            flux TEXT NOT NULL DEFAULT '',
            foreigners TEXT NOT NULL DEFAULT '',
            ac_presence TEXT NOT NULL DEFAULT '',
            armies_groups TEXT NOT NULL DEFAULT '',
            villagers TEXT NOT NULL DEFAULT '',
            moves TEXT NOT NULL DEFAULT '',
            bbcode TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reports_date_village ON reports(report_date, village)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_organisations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS organisations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nom_complet TEXT NOT NULL,
            nom_abrege TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the brigands table
///
/// `"order"` is the legacy free-text affiliation; `order_id` is the
/// normalized link. Stores created before the link existed get the
/// column from migration v1.
async fn create_brigands_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS brigands (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            list TEXT DEFAULT '',
            facts TEXT DEFAULT '',
            is_crown INTEGER NOT NULL DEFAULT 0,
            is_png INTEGER NOT NULL DEFAULT 0,
            "order" TEXT DEFAULT '',
            order_id INTEGER NULL REFERENCES organisations(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_schema_creates_tables() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        prepare_schema(&pool).await.unwrap();

        for table in ["villages", "reports", "organisations", "brigands", "schema_version"] {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert!(exists, "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_prepare_schema_twice_is_harmless() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        prepare_schema(&pool).await.unwrap();
        prepare_schema(&pool).await.unwrap();
    }
}
