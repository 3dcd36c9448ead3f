//! Report composition engine
//!
//! Turns the eight free-text fields a maréchal submits into the BBCode
//! document posted on the forum:
//!
//! - [`parser`]: positional `|` grammar for the structured sections
//! - [`names`]: candidate proper names in prose blocks
//! - [`render`]: category colours, emphasis, banners and legend
//! - [`assembler`]: section ordering and the final document
//! - [`validation`]: submission checks and the blackout gate

pub mod assembler;
pub mod names;
pub mod parser;
pub mod render;
pub mod validation;

pub use assembler::{compose, Section};
pub use names::extract_names;
pub use parser::{parse_field, ObservationRecord};
pub use render::{Category, RenderStyle};
pub use validation::{
    validate, validate_and_compose, ComposedReport, SubmissionOptions, SubmissionRejection,
    ValidationError,
};

use serde::{Deserialize, Serialize};

/// The eight raw text fields of a report, one per input area
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFields {
    pub mem_visions: String,
    pub surveillance: String,
    pub flux: String,
    pub foreigners: String,
    pub ac_presence: String,
    pub armies_groups: String,
    pub villagers: String,
    pub moves: String,
}

impl RawFields {
    /// Copy with every field trimmed, as stored
    pub fn trimmed(&self) -> Self {
        Self {
            mem_visions: self.mem_visions.trim().to_string(),
            surveillance: self.surveillance.trim().to_string(),
            flux: self.flux.trim().to_string(),
            foreigners: self.foreigners.trim().to_string(),
            ac_presence: self.ac_presence.trim().to_string(),
            armies_groups: self.armies_groups.trim().to_string(),
            villagers: self.villagers.trim().to_string(),
            moves: self.moves.trim().to_string(),
        }
    }
}

/// Answer to "was the watch performed?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchDuty {
    Yes,
    No,
    Unset,
}

impl WatchDuty {
    /// Parse the form value: `oui`, `non`, anything else is unset
    pub fn from_form(value: &str) -> Self {
        match value {
            "oui" => WatchDuty::Yes,
            "non" => WatchDuty::No,
            _ => WatchDuty::Unset,
        }
    }

    pub fn performed(self) -> Option<bool> {
        match self {
            WatchDuty::Yes => Some(true),
            WatchDuty::No => Some(false),
            WatchDuty::Unset => None,
        }
    }
}

/// A report as submitted, before validation
#[derive(Debug, Clone)]
pub struct Submission {
    pub village: String,
    pub fields: RawFields,
    pub watch_duty: WatchDuty,
}
