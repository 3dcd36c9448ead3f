//! Brigand roster persistence
//!
//! Affiliation input is either an explicit organisation id or a legacy
//! free-text label; labels go through the same resolution as the startup
//! backfill so new records are normalized the same way.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, info};

use super::models::{Brigand, Organisation};
use crate::affiliation::resolve_in_store;
use crate::{Error, Result};

const SELECT_BRIGAND: &str = r#"
    SELECT b.id, b.name, b.list, b.facts, b.is_crown, b.is_png, b.order_id, b."order",
           o.nom_complet AS org_nom_complet, o.nom_abrege AS org_nom_abrege
    FROM brigands b
    LEFT JOIN organisations o ON o.id = b.order_id
"#;

/// Affiliation as supplied by a client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffiliationInput {
    /// Registry id; wins over `order` when present
    pub order_id: Option<i64>,
    /// Legacy label (short or full organisation name)
    pub order: Option<String>,
}

/// Fields of a brigand to create
#[derive(Debug, Clone, Default)]
pub struct NewBrigand {
    pub name: String,
    pub list: String,
    pub facts: String,
    pub is_crown: bool,
    pub is_png: bool,
    pub affiliation: AffiliationInput,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct BrigandPatch {
    pub name: Option<String>,
    pub list: Option<String>,
    pub facts: Option<String>,
    pub is_crown: Option<bool>,
    pub is_png: Option<bool>,
    /// When present the link is recomputed, possibly to none
    pub affiliation: Option<AffiliationInput>,
}

fn from_row(row: &SqliteRow) -> Brigand {
    let order_id: Option<i64> = row.get("order_id");
    let org_name: Option<String> = row.get("org_nom_complet");
    let organisation = match (order_id, org_name) {
        (Some(id), Some(nom_complet)) => Some(Organisation {
            id,
            nom_complet,
            nom_abrege: row.get("org_nom_abrege"),
        }),
        _ => None,
    };

    Brigand {
        id: row.get("id"),
        name: row.get("name"),
        list: row.get::<Option<String>, _>("list").unwrap_or_default(),
        facts: row.get::<Option<String>, _>("facts").unwrap_or_default(),
        is_crown: row.get::<Option<bool>, _>("is_crown").unwrap_or(false),
        is_png: row.get::<Option<bool>, _>("is_png").unwrap_or(false),
        order_id,
        order: row.get::<Option<String>, _>("order").unwrap_or_default(),
        organisation,
    }
}

fn required_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("Le nom IG est obligatoire".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Turn client affiliation input into a registry link
///
/// An explicit id must exist. A label that matches nothing yields no link
/// and is not an error.
pub async fn resolve_link(pool: &SqlitePool, input: &AffiliationInput) -> Result<Option<i64>> {
    if let Some(id) = input.order_id {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM organisations WHERE id = ?)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        if !exists {
            return Err(Error::InvalidInput(format!("Organisation introuvable: {}", id)));
        }
        return Ok(Some(id));
    }

    match input.order.as_deref() {
        Some(label) if !label.trim().is_empty() => resolve_in_store(pool, label).await,
        _ => Ok(None),
    }
}

/// Roster, by name
pub async fn list_brigands(pool: &SqlitePool) -> Result<Vec<Brigand>> {
    let rows = sqlx::query(&format!("{} ORDER BY b.name ASC, b.id ASC", SELECT_BRIGAND))
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(from_row).collect())
}

pub async fn get_brigand(pool: &SqlitePool, id: i64) -> Result<Option<Brigand>> {
    let row = sqlx::query(&format!("{} WHERE b.id = ?", SELECT_BRIGAND))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// First brigand with exactly this name
pub async fn find_brigand_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Brigand>> {
    let row = sqlx::query(&format!("{} WHERE b.name = ? ORDER BY b.id ASC LIMIT 1", SELECT_BRIGAND))
        .bind(name.trim())
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Add a brigand to the roster
///
/// The supplied label is kept in the legacy column as well, so the
/// original wording survives even when it resolved to a link.
pub async fn create_brigand(pool: &SqlitePool, new: &NewBrigand) -> Result<Brigand> {
    let name = required_name(&new.name)?;
    let order_id = resolve_link(pool, &new.affiliation).await?;
    let legacy = new
        .affiliation
        .order
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();

    let id = sqlx::query(
        r#"
        INSERT INTO brigands (name, list, facts, is_crown, is_png, "order", order_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&name)
    .bind(new.list.trim())
    .bind(new.facts.trim())
    .bind(new.is_crown)
    .bind(new.is_png)
    .bind(legacy)
    .bind(order_id)
    .execute(pool)
    .await?
    .last_insert_rowid();

    info!("Created brigand {} ({})", id, name);

    get_brigand(pool, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Brigand {} vanished after insert", id)))
}

/// Apply a partial update
///
/// The legacy text column is never rewritten here.
pub async fn update_brigand(pool: &SqlitePool, id: i64, patch: &BrigandPatch) -> Result<Brigand> {
    let mut brigand = get_brigand(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Brigand {}", id)))?;

    if let Some(name) = &patch.name {
        brigand.name = required_name(name)?;
    }
    if let Some(list) = &patch.list {
        brigand.list = list.trim().to_string();
    }
    if let Some(facts) = &patch.facts {
        brigand.facts = facts.trim().to_string();
    }
    if let Some(is_crown) = patch.is_crown {
        brigand.is_crown = is_crown;
    }
    if let Some(is_png) = patch.is_png {
        brigand.is_png = is_png;
    }
    if let Some(affiliation) = &patch.affiliation {
        brigand.order_id = resolve_link(pool, affiliation).await?;
    }

    sqlx::query(
        r#"
        UPDATE brigands
        SET name = ?, list = ?, facts = ?, is_crown = ?, is_png = ?, order_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&brigand.name)
    .bind(&brigand.list)
    .bind(&brigand.facts)
    .bind(brigand.is_crown)
    .bind(brigand.is_png)
    .bind(brigand.order_id)
    .bind(id)
    .execute(pool)
    .await?;

    debug!("Updated brigand {}", id);

    get_brigand(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Brigand {}", id)))
}

/// Delete one brigand per listed name; returns the names actually removed
pub async fn delete_brigands_by_name(pool: &SqlitePool, names: &[String]) -> Result<Vec<String>> {
    let mut deleted = Vec::new();

    for name in names {
        let affected = sqlx::query(
            "DELETE FROM brigands WHERE id = (SELECT id FROM brigands WHERE name = ? ORDER BY id LIMIT 1)"
        )
        .bind(name.trim())
        .execute(pool)
        .await?
        .rows_affected();

        if affected > 0 {
            deleted.push(name.clone());
        }
    }

    if !deleted.is_empty() {
        info!("Deleted {} brigand(s) by name", deleted.len());
    }
    Ok(deleted)
}
