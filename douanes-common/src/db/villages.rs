//! Village list

use sqlx::SqlitePool;
use tracing::info;

use super::models::Village;
use crate::{Error, Result};

pub async fn list_villages(pool: &SqlitePool) -> Result<Vec<Village>> {
    let villages = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM villages ORDER BY name ASC")
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|(id, name)| Village { id, name })
        .collect();

    Ok(villages)
}

/// Names only, in list order
pub async fn village_names(pool: &SqlitePool) -> Result<Vec<String>> {
    Ok(list_villages(pool).await?.into_iter().map(|v| v.name).collect())
}

/// Add a village; `false` if it already existed
pub async fn insert_village(pool: &SqlitePool, name: &str) -> Result<bool> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Le nom du village est obligatoire".to_string()));
    }

    let affected = sqlx::query("INSERT OR IGNORE INTO villages (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

/// Insert configured villages that are not yet known
pub async fn seed_villages(pool: &SqlitePool, names: &[String]) -> Result<usize> {
    let mut added = 0;
    for name in names.iter().filter(|n| !n.trim().is_empty()) {
        if insert_village(pool, name).await? {
            added += 1;
        }
    }

    if added > 0 {
        info!("Seeded {} village(s)", added);
    }
    Ok(added)
}
