//! # Douanes Common Library
//!
//! Shared code for the maréchaussée reporting service:
//! - Report composition (field parsing, name extraction, BBCode rendering)
//! - Game-day and blackout-window computation
//! - Database schema, migrations and queries
//! - Affiliation registry resolution and legacy backfill
//! - Configuration loading

pub mod affiliation;
pub mod config;
pub mod db;
pub mod error;
pub mod game_day;
pub mod report;

pub use error::{Error, Result};
