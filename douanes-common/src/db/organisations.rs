//! Organisation registry persistence
//!
//! Input rules (non-blank full name, blank short name stored as NULL) are
//! enforced here so every caller gets them.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

use super::models::Organisation;
use crate::{Error, Result};

/// Partial update of an organisation; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct OrganisationPatch {
    pub nom_complet: Option<String>,
    /// `Some("")` clears the short name
    pub nom_abrege: Option<String>,
}

fn from_row(row: &SqliteRow) -> Organisation {
    Organisation {
        id: row.get("id"),
        nom_complet: row.get("nom_complet"),
        nom_abrege: row.get("nom_abrege"),
    }
}

fn required_full_name(nom_complet: &str) -> Result<String> {
    let trimmed = nom_complet.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("Le nom complet est obligatoire".to_string()));
    }
    Ok(trimmed.to_string())
}

fn optional_short_name(nom_abrege: Option<&str>) -> Option<String> {
    nom_abrege
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// All organisations, by full name
pub async fn list_organisations(pool: &SqlitePool) -> Result<Vec<Organisation>> {
    let rows = sqlx::query(
        "SELECT id, nom_complet, nom_abrege FROM organisations ORDER BY nom_complet ASC, id ASC"
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(from_row).collect())
}

pub async fn get_organisation(pool: &SqlitePool, id: i64) -> Result<Option<Organisation>> {
    let row = sqlx::query("SELECT id, nom_complet, nom_abrege FROM organisations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Register a new organisation
pub async fn create_organisation(
    pool: &SqlitePool,
    nom_complet: &str,
    nom_abrege: Option<&str>,
) -> Result<Organisation> {
    let nom_complet = required_full_name(nom_complet)?;
    let nom_abrege = optional_short_name(nom_abrege);

    let id = sqlx::query("INSERT INTO organisations (nom_complet, nom_abrege) VALUES (?, ?)")
        .bind(&nom_complet)
        .bind(&nom_abrege)
        .execute(pool)
        .await?
        .last_insert_rowid();

    info!("Created organisation {} ({})", id, nom_complet);

    Ok(Organisation {
        id,
        nom_complet,
        nom_abrege,
    })
}

/// Apply a partial update; the full name can change but never go blank
pub async fn update_organisation(
    pool: &SqlitePool,
    id: i64,
    patch: &OrganisationPatch,
) -> Result<Organisation> {
    let mut org = get_organisation(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Organisation {}", id)))?;

    if let Some(nom_complet) = &patch.nom_complet {
        org.nom_complet = required_full_name(nom_complet)?;
    }
    if let Some(nom_abrege) = &patch.nom_abrege {
        org.nom_abrege = optional_short_name(Some(nom_abrege));
    }

    sqlx::query("UPDATE organisations SET nom_complet = ?, nom_abrege = ? WHERE id = ?")
        .bind(&org.nom_complet)
        .bind(&org.nom_abrege)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(org)
}

/// Delete an organisation, unlinking its brigands first
///
/// Brigands are never deleted with their organisation; their legacy text
/// is untouched. Returns `false` when no such organisation exists.
pub async fn delete_organisation(pool: &SqlitePool, id: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let unlinked = sqlx::query("UPDATE brigands SET order_id = NULL WHERE order_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let deleted = sqlx::query("DELETE FROM organisations WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    if deleted > 0 {
        info!("Deleted organisation {} ({} brigand(s) unlinked)", id, unlinked);
    }
    Ok(deleted > 0)
}
