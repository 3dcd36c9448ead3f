//! Report persistence and daily status queries

use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

use super::models::Report;
use crate::report::{ComposedReport, RawFields};
use crate::Result;

fn from_row(row: &SqliteRow) -> Report {
    Report {
        id: row.get("id"),
        created_at: row.get("created_at"),
        report_date: row.get("report_date"),
        user_id: row.get("user_id"),
        village: row.get("village"),
        tour_de_garde: row.get("tour_de_garde"),
        fields: RawFields {
            mem_visions: row.get("mem_visions"),
            surveillance: row.get("surveillance"),
            flux: row.get("flux"),
            foreigners: row.get("foreigners"),
            ac_presence: row.get("ac_presence"),
            armies_groups: row.get("armies_groups"),
            villagers: row.get("villagers"),
            moves: row.get("moves"),
        },
        bbcode: row.get("bbcode"),
    }
}

/// Persist a composed report; returns its id
pub async fn insert_report(
    pool: &SqlitePool,
    report: &ComposedReport,
    user_id: Option<i64>,
) -> Result<i64> {
    let f = &report.fields;
    let id = sqlx::query(
        r#"
        INSERT INTO reports (
            created_at, report_date, user_id, village, tour_de_garde,
            mem_visions, surveillance, flux, foreigners, ac_presence,
            armies_groups, villagers, moves, bbcode
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(chrono::Utc::now())
    .bind(report.game_day)
    .bind(user_id)
    .bind(&report.village)
    .bind(report.watch_performed)
    .bind(&f.mem_visions)
    .bind(&f.surveillance)
    .bind(&f.flux)
    .bind(&f.foreigners)
    .bind(&f.ac_presence)
    .bind(&f.armies_groups)
    .bind(&f.villagers)
    .bind(&f.moves)
    .bind(&report.markup)
    .execute(pool)
    .await?
    .last_insert_rowid();

    info!("Stored report {} for {} ({})", id, report.village, report.game_day);
    Ok(id)
}

pub async fn get_report(pool: &SqlitePool, id: i64) -> Result<Option<Report>> {
    let row = sqlx::query("SELECT * FROM reports WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// `(village, report id)` for every report filed on `day`, oldest first
pub async fn reports_for_day(pool: &SqlitePool, day: NaiveDate) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT village, id FROM reports WHERE report_date = ? ORDER BY id ASC",
    )
    .bind(day)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Distinct villages with at least one report on `day`
pub async fn villages_reported_on(pool: &SqlitePool, day: NaiveDate) -> Result<Vec<String>> {
    let villages = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT village FROM reports WHERE report_date = ? ORDER BY village ASC",
    )
    .bind(day)
    .fetch_all(pool)
    .await?;

    Ok(villages)
}
