//! On-disk database initialization tests
//!
//! Covers fresh creation, reopening, and upgrading a store written before
//! brigands had a normalized organisation link.

use douanes_common::db::{
    brigands::list_brigands, get_schema_version, init_database, CURRENT_SCHEMA_VERSION,
};
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

#[tokio::test]
async fn test_creates_database_and_parent_dirs() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("douanes.db");

    let pool = init_database(&db_path).await.unwrap();

    assert!(db_path.exists());
    assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);
}

#[tokio::test]
async fn test_reopen_keeps_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("douanes.db");

    {
        let pool = init_database(&db_path).await.unwrap();
        sqlx::query("INSERT INTO villages (name) VALUES ('Montfort')")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }

    let pool = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM villages")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_upgrades_legacy_store_and_backfills_links() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("legacy.db");

    // Store as written before the link column existed
    {
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new().max_connections(1).connect(&url).await.unwrap();
        for stmt in [
            "CREATE TABLE organisations (id INTEGER PRIMARY KEY AUTOINCREMENT, nom_complet TEXT NOT NULL, nom_abrege TEXT)",
            r#"CREATE TABLE brigands (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, list TEXT, facts TEXT, is_crown INTEGER, is_png INTEGER, "order" TEXT)"#,
            "INSERT INTO organisations (nom_complet, nom_abrege) VALUES ('Armée de la Couronne', 'AC12')",
            "INSERT INTO organisations (nom_complet, nom_abrege) VALUES ('Ordre Noir', NULL)",
            r#"INSERT INTO brigands (name, list, facts, is_crown, is_png, "order") VALUES ('Gaston', 'noire', NULL, 1, 0, 'AC12')"#,
            r#"INSERT INTO brigands (name, list, facts, is_crown, is_png, "order") VALUES ('Odon', NULL, '', NULL, NULL, ' Ordre Noir ')"#,
            r#"INSERT INTO brigands (name, list, facts, is_crown, is_png, "order") VALUES ('Pierre', '', '', 0, 0, 'Inconnus')"#,
        ] {
            sqlx::query(stmt).execute(&pool).await.unwrap();
        }
        pool.close().await;
    }

    let pool = init_database(&db_path).await.unwrap();
    assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);

    let brigands = list_brigands(&pool).await.unwrap();
    let by_name = |name: &str| brigands.iter().find(|b| b.name == name).unwrap().clone();

    let gaston = by_name("Gaston");
    assert_eq!(gaston.order_id, Some(1));
    assert_eq!(gaston.order, "AC12");
    assert!(gaston.is_crown);
    assert_eq!(gaston.facts, "");

    let odon = by_name("Odon");
    assert_eq!(odon.order_id, Some(2));
    assert_eq!(odon.order_label(), "Ordre Noir");
    assert!(!odon.is_png);

    let pierre = by_name("Pierre");
    assert_eq!(pierre.order_id, None);
    assert_eq!(pierre.order_label(), "Inconnus");

    pool.close().await;

    // Second start finds nothing left to do
    let pool = init_database(&db_path).await.unwrap();
    let linked: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM brigands WHERE order_id IS NOT NULL")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(linked, 2);
    assert_eq!(
        douanes_common::affiliation::migrate_legacy_affiliations(&pool).await.unwrap(),
        0
    );
}
