//! Game-day and submission window rules
//!
//! The forum's day does not roll over at midnight: reports filed in the
//! small hours still belong to the previous evening, and the 03:00-05:00
//! slot is reserved for game maintenance.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Hour at which the maintenance slot starts
const MAINTENANCE_START_HOUR: u32 = 3;

/// Hour at which the new game day opens
const DAY_OPENS_HOUR: u32 = 5;

/// Business date a timestamp belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "date", rename_all = "snake_case")]
pub enum GameDay {
    /// Regular game day
    Day(NaiveDate),
    /// Inside the maintenance slot: no game day is defined
    Maintenance,
}

impl GameDay {
    /// The date, if one is defined
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            GameDay::Day(date) => Some(date),
            GameDay::Maintenance => None,
        }
    }
}

/// Resolve the game day for a local wall-clock time
///
/// - before 03:00: previous calendar date
/// - 03:00 to 05:00: [`GameDay::Maintenance`]
/// - from 05:00: current calendar date
pub fn game_day(now: NaiveDateTime) -> GameDay {
    let hour = now.hour();
    if hour < MAINTENANCE_START_HOUR {
        GameDay::Day(now.date() - Duration::days(1))
    } else if hour < DAY_OPENS_HOUR {
        GameDay::Maintenance
    } else {
        GameDay::Day(now.date())
    }
}

/// Day shown on the supervisors' daily status board
///
/// Unlike [`game_day`] this never goes undefined: anything before 05:00
/// still counts as the previous day.
pub fn active_day(now: NaiveDateTime) -> NaiveDate {
    if now.hour() < DAY_OPENS_HOUR {
        now.date() - Duration::days(1)
    } else {
        now.date()
    }
}

/// Daily time range during which report submission is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlackoutWindow {
    pub from: NaiveTime,
    pub to: NaiveTime,
}

impl BlackoutWindow {
    pub fn new(from: NaiveTime, to: NaiveTime) -> Self {
        Self { from, to }
    }

    /// Parse a window from two `HH:MM` strings
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        Ok(Self::new(parse_hhmm(from)?, parse_hhmm(to)?))
    }

    /// Whether `time` falls inside the window
    ///
    /// A window whose end precedes its start wraps past midnight.
    /// Equal bounds describe an empty window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.from < self.to {
            self.from <= time && time < self.to
        } else if self.from > self.to {
            time >= self.from || time < self.to
        } else {
            false
        }
    }
}

impl Default for BlackoutWindow {
    fn default() -> Self {
        Self {
            from: NaiveTime::from_hms_opt(MAINTENANCE_START_HOUR, 0, 0).unwrap_or_default(),
            to: NaiveTime::from_hms_opt(DAY_OPENS_HOUR, 0, 0).unwrap_or_default(),
        }
    }
}

impl fmt::Display for BlackoutWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from.format("%H:%M"), self.to.format("%H:%M"))
    }
}

impl FromStr for BlackoutWindow {
    type Err = Error;

    /// Parse `HH:MM-HH:MM`
    fn from_str(s: &str) -> Result<Self> {
        let (from, to) = s
            .split_once('-')
            .ok_or_else(|| Error::Config(format!("Invalid blackout window: {}", s)))?;
        Self::parse(from, to)
    }
}

/// Whether a submission made at `now` falls inside the blackout window
pub fn is_submission_blocked(now: NaiveDateTime, window: &BlackoutWindow) -> bool {
    window.contains(now.time())
}

/// Parse an `HH:MM` clock time
pub fn parse_hhmm(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| Error::Config(format!("Invalid time '{}' (expected HH:MM): {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_game_day_before_three_is_previous_date() {
        assert_eq!(game_day(at("2024-03-10", "00:00")), GameDay::Day(date("2024-03-09")));
        assert_eq!(game_day(at("2024-03-10", "02:59")), GameDay::Day(date("2024-03-09")));
    }

    #[test]
    fn test_game_day_maintenance_slot() {
        assert_eq!(game_day(at("2024-03-10", "03:00")), GameDay::Maintenance);
        assert_eq!(game_day(at("2024-03-10", "04:59")), GameDay::Maintenance);
    }

    #[test]
    fn test_game_day_from_five_is_current_date() {
        assert_eq!(game_day(at("2024-03-10", "05:00")), GameDay::Day(date("2024-03-10")));
        assert_eq!(game_day(at("2024-03-10", "23:59")), GameDay::Day(date("2024-03-10")));
    }

    #[test]
    fn test_game_day_crosses_month_boundary() {
        assert_eq!(game_day(at("2024-03-01", "01:30")), GameDay::Day(date("2024-02-29")));
    }

    #[test]
    fn test_active_day_uses_five_o_clock_threshold() {
        assert_eq!(active_day(at("2024-03-10", "04:00")), date("2024-03-09"));
        assert_eq!(active_day(at("2024-03-10", "05:00")), date("2024-03-10"));
    }

    #[test]
    fn test_default_window_blocks_three_to_five() {
        let window = BlackoutWindow::default();
        assert!(!is_submission_blocked(at("2024-03-10", "02:59"), &window));
        assert!(is_submission_blocked(at("2024-03-10", "03:00"), &window));
        assert!(is_submission_blocked(at("2024-03-10", "04:30"), &window));
        assert!(!is_submission_blocked(at("2024-03-10", "05:00"), &window));
    }

    #[test]
    fn test_window_wrapping_midnight() {
        let window = BlackoutWindow::parse("23:30", "01:00").unwrap();
        assert!(window.contains(parse_hhmm("23:45").unwrap()));
        assert!(window.contains(parse_hhmm("00:30").unwrap()));
        assert!(!window.contains(parse_hhmm("01:00").unwrap()));
        assert!(!window.contains(parse_hhmm("12:00").unwrap()));
    }

    #[test]
    fn test_window_with_equal_bounds_is_empty() {
        let window = BlackoutWindow::parse("04:00", "04:00").unwrap();
        assert!(!window.contains(parse_hhmm("04:00").unwrap()));
    }

    #[test]
    fn test_window_from_str_and_display() {
        let window: BlackoutWindow = "02:15-06:00".parse().unwrap();
        assert_eq!(window.to_string(), "02:15-06:00");
        assert!("0215".parse::<BlackoutWindow>().is_err());
        assert!(parse_hhmm("25:00").is_err());
    }
}
