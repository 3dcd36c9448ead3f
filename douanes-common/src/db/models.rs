//! Database models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::report::RawFields;

/// A village reports can be filed for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Village {
    pub id: i64,
    pub name: String,
}

/// A stored report
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub report_date: Option<NaiveDate>,
    pub user_id: Option<i64>,
    pub village: String,
    pub tour_de_garde: bool,
    #[serde(flatten)]
    pub fields: RawFields,
    pub bbcode: String,
}

/// Affiliation registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organisation {
    pub id: i64,
    pub nom_complet: String,
    pub nom_abrege: Option<String>,
}

impl Organisation {
    /// Short name when there is one, full name otherwise
    pub fn display_label(&self) -> &str {
        match self.nom_abrege.as_deref().map(str::trim) {
            Some(short) if !short.is_empty() => short,
            _ => self.nom_complet.trim(),
        }
    }
}

/// A tracked person on the roster
///
/// `order` is the legacy free-text affiliation, kept for audit once
/// `order_id` links the normalized registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brigand {
    pub id: i64,
    pub name: String,
    pub list: String,
    pub facts: String,
    pub is_crown: bool,
    pub is_png: bool,
    pub order_id: Option<i64>,
    pub order: String,
    pub organisation: Option<Organisation>,
}

impl Brigand {
    /// Affiliation shown to users: linked organisation, else legacy text
    pub fn order_label(&self) -> String {
        match &self.organisation {
            Some(org) => org.display_label().to_string(),
            None => self.order.clone(),
        }
    }
}
