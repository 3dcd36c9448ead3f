//! douanes-rp library: maréchaussée reporting service
//!
//! Report submission, the daily status board, the brigand roster and the
//! organisation registry over one SQLite store.

use axum::Router;
use chrono::NaiveDateTime;
use douanes_common::report::SubmissionOptions;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Source of local wall-clock time
pub type Clock = fn() -> NaiveDateTime;

/// Local time of the process (`TZ` decides the zone)
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Blackout window and rendering style
    pub options: SubmissionOptions,
    pub clock: Clock,
}

impl AppState {
    pub fn new(db: SqlitePool, options: SubmissionOptions) -> Self {
        Self {
            db,
            options,
            clock: local_now,
        }
    }

    /// Same state with a fixed notion of "now"
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }
}

/// Build application router
///
/// `/health` needs no role header; every `/api` route does.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::village_routes())
        .merge(api::report_routes())
        .merge(api::brigand_routes())
        .merge(api::organisation_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
