//! Report submission and daily status endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use douanes_common::db::{reports, villages, Report};
use douanes_common::game_day::{active_day, game_day, is_submission_blocked, GameDay};
use douanes_common::report::{validate_and_compose, RawFields, Submission, WatchDuty};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Agent;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Report form as posted by a maréchal
#[derive(Debug, Deserialize)]
pub struct SubmitReportRequest {
    #[serde(default)]
    pub village: String,
    /// `oui` or `non`; anything else counts as unanswered
    #[serde(default)]
    pub tour_de_garde: Option<String>,
    #[serde(flatten)]
    pub fields: RawFields,
}

impl SubmitReportRequest {
    fn into_submission(self) -> Submission {
        Submission {
            village: self.village,
            watch_duty: WatchDuty::from_form(self.tour_de_garde.as_deref().unwrap_or_default()),
            fields: self.fields,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitReportResponse {
    pub id: i64,
    pub game_day: NaiveDate,
    pub markup: String,
}

#[derive(Debug, Serialize)]
pub struct GameDayResponse {
    pub game_day: GameDay,
    pub blocked: bool,
    pub blackout: String,
    /// Villages with a report for the current game day
    pub reported_villages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportedVillage {
    pub village: String,
    pub report_id: i64,
}

#[derive(Debug, Serialize)]
pub struct DailyStatusResponse {
    pub date: NaiveDate,
    pub reported: Vec<ReportedVillage>,
    pub missing: Vec<String>,
}

/// POST /api/reports
pub async fn submit_report(
    agent: Agent,
    State(state): State<AppState>,
    Json(request): Json<SubmitReportRequest>,
) -> ApiResult<(StatusCode, Json<SubmitReportResponse>)> {
    let now = state.now();

    // Checked before touching the store so a blocked submission costs nothing
    if is_submission_blocked(now, &state.options.blackout) {
        debug!("Submission refused at {} (blackout {})", now, state.options.blackout);
        return Err(ApiError::Blocked);
    }

    let valid_villages = villages::village_names(&state.db).await?;
    let submission = request.into_submission();
    let composed = validate_and_compose(&submission, &valid_villages, now, &state.options)?;

    let id = reports::insert_report(&state.db, &composed, agent.user_id).await?;
    info!(
        "Report {} submitted for {} on {} by agent {:?}",
        id, composed.village, composed.game_day, agent.user_id
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitReportResponse {
            id,
            game_day: composed.game_day,
            markup: composed.markup,
        }),
    ))
}

/// GET /api/reports/:id
pub async fn get_report(
    _agent: Agent,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Report>> {
    reports::get_report(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Rapport {}", id)))
}

/// GET /api/game-day
pub async fn current_game_day(
    _agent: Agent,
    State(state): State<AppState>,
) -> ApiResult<Json<GameDayResponse>> {
    let now = state.now();
    let day = game_day(now);

    let reported_villages = match day.date() {
        Some(date) => reports::villages_reported_on(&state.db, date).await?,
        None => Vec::new(),
    };

    Ok(Json(GameDayResponse {
        game_day: day,
        blocked: is_submission_blocked(now, &state.options.blackout),
        blackout: state.options.blackout.to_string(),
        reported_villages,
    }))
}

/// GET /api/reports/daily
///
/// Status of the active day: before the day opens this is still the
/// previous day.
pub async fn daily_status(
    agent: Agent,
    State(state): State<AppState>,
) -> ApiResult<Json<DailyStatusResponse>> {
    agent.require_supervisor()?;

    let date = active_day(state.now());
    let filed = reports::reports_for_day(&state.db, date).await?;
    let all = villages::village_names(&state.db).await?;

    // One entry per village: the first report filed that day
    let mut reported: Vec<ReportedVillage> = Vec::new();
    for (village, report_id) in filed {
        if !reported.iter().any(|r| r.village == village) {
            reported.push(ReportedVillage { village, report_id });
        }
    }
    let missing = all
        .into_iter()
        .filter(|v| !reported.iter().any(|r| &r.village == v))
        .collect();

    Ok(Json(DailyStatusResponse {
        date,
        reported,
        missing,
    }))
}

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/api/game-day", get(current_game_day))
        .route("/api/reports", post(submit_report))
        .route("/api/reports/daily", get(daily_status))
        .route("/api/reports/:id", get(get_report))
}
