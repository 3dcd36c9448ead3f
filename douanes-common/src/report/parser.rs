//! Positional `|`-delimited field grammar
//!
//! Operators type one observation per line. Malformed lines degrade to
//! empty attributes rather than failing the whole section.

use serde::Serialize;

/// Field separator inside one observation line
pub const DELIMITER: char = '|';

/// Slots used by the memory and visions section: name | category | membership
pub const MEMORY_SLOTS: usize = 3;

/// Slots used by the surveillance section:
/// name | category | organisation | facts | status | membership
pub const SURVEILLANCE_SLOTS: usize = 6;

/// Marker that flags a subject as a member of the local bureau
const AFFILIATE_MARKER: &str = "a&c";

/// One parsed observation line
///
/// Positions a line did not provide are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObservationRecord {
    pub subject: String,
    pub category: String,
    pub affiliation: String,
    pub notes: String,
    pub status: String,
    pub membership: String,
}

impl ObservationRecord {
    /// Whether the membership slot marks a local affiliate
    pub fn is_affiliate(&self) -> bool {
        self.membership.to_lowercase().contains(AFFILIATE_MARKER)
    }
}

/// Split one line into exactly `slots` trimmed segments
///
/// Extra segments are dropped, missing ones are empty.
pub fn split_line(line: &str, slots: usize) -> Vec<String> {
    let mut segments: Vec<String> = line
        .split(DELIMITER)
        .take(slots)
        .map(|s| s.trim().to_string())
        .collect();
    segments.resize(slots, String::new());
    segments
}

/// Parse a multi-line field into records, in input order
///
/// `slots` (2 to 6) says how many positions the section uses. Blank lines
/// and lines without a subject name produce nothing. The last slot of a
/// section is always its membership flag; sections with fewer than six
/// slots skip the organisation, facts and status positions.
pub fn parse_field(raw: &str, slots: usize) -> Vec<ObservationRecord> {
    let slots = slots.clamp(2, SURVEILLANCE_SLOTS);

    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut segments = split_line(line, slots).into_iter();
            let subject = segments.next().unwrap_or_default();
            if subject.is_empty() {
                return None;
            }
            let category = segments.next().unwrap_or_default();

            let mut record = ObservationRecord {
                subject,
                category,
                ..Default::default()
            };

            if slots == SURVEILLANCE_SLOTS {
                record.affiliation = segments.next().unwrap_or_default();
                record.notes = segments.next().unwrap_or_default();
                record.status = segments.next().unwrap_or_default();
            }
            record.membership = segments.last().unwrap_or_default();

            Some(record)
        })
        .collect()
}
