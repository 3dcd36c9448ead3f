//! Affiliation resolution and legacy backfill
//!
//! Brigands used to carry their organisation as free text. The registry
//! now holds organisations with a full and an optional short name; a label
//! resolves to the entry whose short name equals it, failing that the one
//! whose full name equals it. Matching is exact after trimming. A label
//! that resolves to nothing is left as text and never creates an entry.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::models::Organisation;
use crate::db::organisations::list_organisations;
use crate::Result;

/// Find the registry id a legacy label refers to
pub fn resolve_affiliation(label: &str, registry: &[Organisation]) -> Option<i64> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    let by_short = registry.iter().find(|org| {
        org.nom_abrege
            .as_deref()
            .map(|short| short.trim() == label)
            .unwrap_or(false)
    });

    by_short
        .or_else(|| registry.iter().find(|org| org.nom_complet.trim() == label))
        .map(|org| org.id)
}

/// [`resolve_affiliation`] against the stored registry
pub async fn resolve_in_store(pool: &SqlitePool, label: &str) -> Result<Option<i64>> {
    if label.trim().is_empty() {
        return Ok(None);
    }
    let registry = list_organisations(pool).await?;
    Ok(resolve_affiliation(label, &registry))
}

/// Link every unlinked brigand whose legacy label resolves
///
/// Rows already linked are never touched and the legacy text is kept.
/// Returns the number of rows linked; a second run returns 0.
pub async fn migrate_legacy_affiliations(pool: &SqlitePool) -> Result<u64> {
    let candidates: Vec<(i64, String)> = sqlx::query_as(
        r#"
        SELECT id, "order" FROM brigands
        WHERE order_id IS NULL AND TRIM(COALESCE("order", '')) != ''
        "#,
    )
    .fetch_all(pool)
    .await?;

    if candidates.is_empty() {
        return Ok(0);
    }

    let registry = list_organisations(pool).await?;
    let mut linked = 0;

    for (id, label) in candidates {
        match resolve_affiliation(&label, &registry) {
            Some(order_id) => {
                linked += sqlx::query("UPDATE brigands SET order_id = ? WHERE id = ? AND order_id IS NULL")
                    .bind(order_id)
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected();
                debug!("Brigand {} linked to organisation {} via '{}'", id, order_id, label.trim());
            }
            None => {
                info!("Brigand {}: no organisation matches '{}', kept as text", id, label.trim());
            }
        }
    }

    Ok(linked)
}
