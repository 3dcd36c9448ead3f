//! Submission checks
//!
//! Order matters: the blackout gate is evaluated before any field check
//! and yields one fixed rejection; field problems are all collected so the
//! agent can fix everything in one go.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

use super::assembler::compose;
use super::render::RenderStyle;
use super::{RawFields, Submission, WatchDuty};
use crate::game_day::{game_day, is_submission_blocked, BlackoutWindow, GameDay};

/// A user-correctable problem with a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Indiquez si la garde a été effectuée (oui / non).")]
    WatchDutyUnset,
    #[error("Choisissez un village.")]
    VillageMissing,
    #[error("Le village choisi est invalide.")]
    VillageUnknown,
    #[error("Renseignez la liste des villageois recensés en mairie.")]
    VillagersMissing,
    #[error("Renseignez les armées et groupes présents hors de la ville.")]
    ArmiesGroupsMissing,
}

impl Serialize for ValidationError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Why a submission was not composed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionRejection {
    /// Inside the daily blackout window
    #[error("Dépôt bloqué.")]
    Blocked,
    /// One or more field problems, all of them
    #[error("{} erreur(s) de saisie", .0.len())]
    Invalid(Vec<ValidationError>),
}

/// Settings the composition depends on besides the submission itself
#[derive(Debug, Clone, Default)]
pub struct SubmissionOptions {
    pub blackout: BlackoutWindow,
    pub style: RenderStyle,
}

/// A validated, rendered report ready to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedReport {
    pub game_day: NaiveDate,
    pub village: String,
    pub watch_performed: bool,
    pub fields: RawFields,
    pub markup: String,
}

/// Collect every field problem of a submission
///
/// `valid_villages` is the set of villages currently open for reports.
pub fn validate(submission: &Submission, valid_villages: &[String]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if submission.watch_duty == WatchDuty::Unset {
        errors.push(ValidationError::WatchDutyUnset);
    }

    let village = submission.village.trim();
    if village.is_empty() {
        errors.push(ValidationError::VillageMissing);
    } else if !valid_villages.iter().any(|v| v == village) {
        errors.push(ValidationError::VillageUnknown);
    }

    if submission.fields.villagers.trim().is_empty() {
        errors.push(ValidationError::VillagersMissing);
    }
    if submission.fields.armies_groups.trim().is_empty() {
        errors.push(ValidationError::ArmiesGroupsMissing);
    }

    errors
}

/// Gate, validate and render a submission made at local time `now`
pub fn validate_and_compose(
    submission: &Submission,
    valid_villages: &[String],
    now: NaiveDateTime,
    options: &SubmissionOptions,
) -> Result<ComposedReport, SubmissionRejection> {
    if is_submission_blocked(now, &options.blackout) {
        return Err(SubmissionRejection::Blocked);
    }

    let errors = validate(submission, valid_villages);
    if !errors.is_empty() {
        return Err(SubmissionRejection::Invalid(errors));
    }

    // A window configured narrower than the maintenance slot still has no
    // game day to file under.
    let day = match game_day(now) {
        GameDay::Day(day) => day,
        GameDay::Maintenance => return Err(SubmissionRejection::Blocked),
    };

    let watch_performed = submission.watch_duty.performed().unwrap_or(false);
    let village = submission.village.trim().to_string();
    let fields = submission.fields.trimmed();
    let markup = compose(&village, day, &fields, watch_performed, &options.style);

    Ok(ComposedReport {
        game_day: day,
        village,
        watch_performed,
        fields,
        markup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::render::WATCH_NOT_PERFORMED;

    fn villages() -> Vec<String> {
        vec!["Montfort".to_string(), "Auch".to_string()]
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn montfort(watch_duty: WatchDuty) -> Submission {
        Submission {
            village: "Montfort".to_string(),
            fields: RawFields {
                villagers: "Jean, Marie".to_string(),
                armies_groups: "Garnison".to_string(),
                ..Default::default()
            },
            watch_duty,
        }
    }

    #[test]
    fn test_all_errors_collected() {
        let submission = Submission {
            village: String::new(),
            fields: RawFields::default(),
            watch_duty: WatchDuty::Unset,
        };
        let errors = validate(&submission, &villages());
        assert_eq!(
            errors,
            vec![
                ValidationError::WatchDutyUnset,
                ValidationError::VillageMissing,
                ValidationError::VillagersMissing,
                ValidationError::ArmiesGroupsMissing,
            ]
        );
    }

    #[test]
    fn test_unknown_village_rejected() {
        let mut submission = montfort(WatchDuty::Yes);
        submission.village = "Carcassonne".to_string();
        assert_eq!(validate(&submission, &villages()), vec![ValidationError::VillageUnknown]);
    }

    #[test]
    fn test_watch_not_performed_scenario() {
        let report = validate_and_compose(
            &montfort(WatchDuty::from_form("non")),
            &villages(),
            at("2024-03-07 18:00"),
            &SubmissionOptions::default(),
        )
        .unwrap();
        assert!(!report.watch_performed);
        assert_eq!(report.game_day, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert!(report.markup.contains(WATCH_NOT_PERFORMED));
        assert!(!report
            .markup
            .contains("[u]MÉMOIRE ET VISIONS[/u] :[/b][/size][/color]\n\n[b]RAS.[/b]"));
    }

    #[test]
    fn test_blackout_checked_before_fields() {
        let empty = Submission {
            village: String::new(),
            fields: RawFields::default(),
            watch_duty: WatchDuty::Unset,
        };
        let result = validate_and_compose(
            &empty,
            &villages(),
            at("2024-03-07 03:30"),
            &SubmissionOptions::default(),
        );
        assert_eq!(result, Err(SubmissionRejection::Blocked));
    }

    #[test]
    fn test_maintenance_slot_outside_configured_window_is_refused() {
        let options = SubmissionOptions {
            blackout: BlackoutWindow::parse("03:00", "04:00").unwrap(),
            ..Default::default()
        };
        let result = validate_and_compose(
            &montfort(WatchDuty::Yes),
            &villages(),
            at("2024-03-07 04:30"),
            &options,
        );
        assert_eq!(result, Err(SubmissionRejection::Blocked));
    }

    #[test]
    fn test_early_morning_files_under_previous_day() {
        let report = validate_and_compose(
            &montfort(WatchDuty::Yes),
            &villages(),
            at("2024-03-07 01:15"),
            &SubmissionOptions::default(),
        )
        .unwrap();
        assert_eq!(report.game_day, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert!(report.markup.contains("Rapport de la maréchaussée du 06 March 2024."));
    }

    #[test]
    fn test_same_inputs_same_markup() {
        let submission = montfort(WatchDuty::Yes);
        let now = at("2024-03-07 20:00");
        let options = SubmissionOptions::default();
        let a = validate_and_compose(&submission, &villages(), now, &options).unwrap();
        let b = validate_and_compose(&submission, &villages(), now, &options).unwrap();
        assert_eq!(a.markup, b.markup);
    }

    #[test]
    fn test_errors_serialize_as_messages() {
        let json = serde_json::to_value(vec![ValidationError::VillageMissing]).unwrap();
        assert_eq!(json, serde_json::json!(["Choisissez un village."]));
    }
}
