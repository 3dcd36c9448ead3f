//! BBCode fragments for report sections
//!
//! Output is consumed verbatim by the forum engine, so colours, spacing
//! and the legend must stay byte-for-byte stable.

use serde::{Deserialize, Serialize};

use super::parser::ObservationRecord;

/// Marker for a section with nothing to report
pub const NOTHING_TO_REPORT: &str = "[b]RAS.[/b]";

/// Memory and visions fallback when the agent skipped watch duty
pub const WATCH_NOT_PERFORMED: &str = "Tour de garde non effectué (autres données fournies).";

/// Default colour of section banners
pub const DEFAULT_TITLE_COLOR: &str = "#162E5A";

/// Colour of the per-section count
const COUNT_COLOR: &str = "blue";

/// Separator between the trailing attributes of a surveillance line
const ATTRIBUTE_SEPARATOR: &str = " — ";

/// Words that introduce the territorial part of a name ("Guillaume de Foix")
const NAME_PARTICLES: [&str; 7] = ["de", "du", "d’", "le", "la", "des", "l’"];

/// Closing legend appended to every report
pub const LEGEND: &str = "[quote][size=9][b]LÉGENDE[/b] :\n\
[color=red][b]Rouge[/b][/color] : Surveillance accrue (liste noire, casier judiciaire, etc.).\n\
[color=darkred][b]DarkRed[/b][/color] : Surveillance légère (prescriptions, casier léger, suspicions, etc.).\n\
[color=green][b]Vert[/b][/color] : Individu sans antécédent judiciaire chez A&C.\n\
[color=indigo][b]PNG[/b][/color] : Persona Non Grata (interdit de territoire).\n\
(statuts spéciaux) : (en prison), (en retraite spirituelle), (en retranchement), (mort).[/size][/quote]";

/// Watch category of an observed subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Wanted by the Crown
    Crown,
    /// Heightened surveillance
    Blacklist,
    /// Light surveillance
    LightWatch,
    /// Banned from the territory
    PersonaNonGrata,
    /// No recognised category
    Unlisted,
}

impl Category {
    /// Map a free-text label, matched exactly once lower-cased
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "couronne" => Category::Crown,
            "liste noire" => Category::Blacklist,
            "surveillance" => Category::LightWatch,
            "png" => Category::PersonaNonGrata,
            _ => Category::Unlisted,
        }
    }

    /// BBCode colour, if the category is coloured
    pub fn color(self) -> Option<&'static str> {
        match self {
            Category::Crown => Some("darkorange"),
            Category::Blacklist => Some("red"),
            Category::LightWatch => Some("darkred"),
            Category::PersonaNonGrata => Some("indigo"),
            Category::Unlisted => None,
        }
    }

    /// Annotation appended to the name in the surveillance section
    pub fn mention(self) -> &'static str {
        match self {
            Category::Crown => " — Recherché par la Couronne de France",
            Category::PersonaNonGrata => " — PNG Interdit de territoire",
            Category::Blacklist | Category::LightWatch | Category::Unlisted => "",
        }
    }
}

/// Presentation options that are not part of the submitted data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStyle {
    pub title_color: String,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            title_color: DEFAULT_TITLE_COLOR.to_string(),
        }
    }
}

fn is_particle(word: &str) -> bool {
    NAME_PARTICLES.contains(&word.to_lowercase().as_str())
}

/// Emphasise a subject name
///
/// Only local affiliates are emphasised. For "Guillaume de Foix" only the
/// given name is bold and the particle and domain follow plainly; names
/// without a particle are bold as a whole.
pub fn format_subject(subject: &str, affiliate: bool) -> String {
    if !affiliate {
        return subject.to_string();
    }

    let tokens: Vec<&str> = subject.split_whitespace().collect();
    match tokens.as_slice() {
        [first, second, ..] if is_particle(second) => {
            format!("[b]{}[/b] {}", first, tokens[1..].join(" "))
        }
        _ => format!("[b]{}[/b]", subject.trim()),
    }
}

fn colorize(category: Category, body: &str) -> String {
    match category.color() {
        Some(color) => format!("[color={}]{}[/color]", color, body),
        None => body.to_string(),
    }
}

/// One line of the memory and visions section
pub fn render_memory_line(record: &ObservationRecord) -> String {
    let category = Category::from_label(&record.category);
    colorize(category, &format_subject(&record.subject, record.is_affiliate()))
}

/// One line of the surveillance section
///
/// `name[ mention]` coloured by category, then ` — organisation`,
/// ` — facts` and ` (status)` for each attribute that is present.
pub fn render_surveillance_line(record: &ObservationRecord) -> String {
    let category = Category::from_label(&record.category);
    let name = format_subject(&record.subject, record.is_affiliate());

    let mut line = match category.color() {
        Some(_) => colorize(category, &format!("{}{}", name, category.mention())),
        None => name,
    };

    for attribute in [&record.affiliation, &record.notes] {
        if !attribute.is_empty() {
            line.push_str(ATTRIBUTE_SEPARATOR);
            line.push_str(attribute);
        }
    }
    if !record.status.is_empty() {
        line.push_str(&format!(" ({})", record.status));
    }

    line
}

/// Section banner, with an optional count
pub fn section_title(label: &str, count: Option<usize>, style: &RenderStyle) -> String {
    let suffix = count
        .map(|n| format!(" [color={}][b]{}[/b][/color]", COUNT_COLOR, n))
        .unwrap_or_default();
    format!(
        "[color={}][size=14][b][u]{}[/u] :[/b][/size][/color]{}\n",
        style.title_color, label, suffix
    )
}

/// Number of non-blank lines
pub fn count_lines(text: &str) -> usize {
    text.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Join rendered lines, or fall back when there are none
pub fn block_or(lines: &[String], fallback: &str) -> String {
    if lines.is_empty() {
        fallback.to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::parser::{parse_field, SURVEILLANCE_SLOTS};

    fn record(subject: &str, category: &str, membership: &str) -> ObservationRecord {
        ObservationRecord {
            subject: subject.to_string(),
            category: category.to_string(),
            membership: membership.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_category_labels_are_case_insensitive() {
        assert_eq!(Category::from_label("Couronne"), Category::Crown);
        assert_eq!(Category::from_label("LISTE NOIRE"), Category::Blacklist);
        assert_eq!(Category::from_label(" surveillance "), Category::LightWatch);
        assert_eq!(Category::from_label("PNG"), Category::PersonaNonGrata);
        assert_eq!(Category::from_label("liste  noire"), Category::Unlisted);
        assert_eq!(Category::from_label(""), Category::Unlisted);
    }

    #[test]
    fn test_unlisted_category_has_no_color_wrapper() {
        for label in ["", "hors", "archives", "suspect"] {
            let line = render_surveillance_line(&record("Jean Dupont", label, ""));
            assert_eq!(line, "Jean Dupont");
            assert!(!line.contains("[color"));
        }
    }

    #[test]
    fn test_format_subject_verbatim_without_affiliation() {
        assert_eq!(format_subject("Guillaume  de Foix", false), "Guillaume  de Foix");
    }

    #[test]
    fn test_format_subject_bolds_given_name_before_particle() {
        assert_eq!(format_subject("Guillaume de Foix", true), "[b]Guillaume[/b] de Foix");
        assert_eq!(format_subject("Anne La Rousse", true), "[b]Anne[/b] La Rousse");
        assert_eq!(format_subject("Pierre d’ Albret", true), "[b]Pierre[/b] d’ Albret");
    }

    #[test]
    fn test_format_subject_without_particle_bolds_whole_name() {
        assert_eq!(format_subject("Jean Dupont", true), "[b]Jean Dupont[/b]");
        assert_eq!(format_subject("Gaston", true), "[b]Gaston[/b]");
    }

    #[test]
    fn test_memory_line_colors_without_mention() {
        let line = render_memory_line(&record("Bertrand", "couronne", ""));
        assert_eq!(line, "[color=darkorange]Bertrand[/color]");
    }

    #[test]
    fn test_surveillance_crown_and_png_mentions() {
        assert_eq!(
            render_surveillance_line(&record("Bertrand", "couronne", "")),
            "[color=darkorange]Bertrand — Recherché par la Couronne de France[/color]"
        );
        assert_eq!(
            render_surveillance_line(&record("Odon", "png", "")),
            "[color=indigo]Odon — PNG Interdit de territoire[/color]"
        );
    }

    #[test]
    fn test_surveillance_full_line_for_affiliate() {
        let records = parse_field(
            "Guillaume de Foix|liste noire|Ordre Noir|vu au marché|en prison|a&c",
            SURVEILLANCE_SLOTS,
        );
        assert_eq!(
            render_surveillance_line(&records[0]),
            "[color=red][b]Guillaume[/b] de Foix[/color] — Ordre Noir — vu au marché (en prison)"
        );
    }

    #[test]
    fn test_surveillance_skips_empty_attributes() {
        let mut r = record("Jean", "surveillance", "");
        r.notes = "rôde près du moulin".to_string();
        assert_eq!(
            render_surveillance_line(&r),
            "[color=darkred]Jean[/color] — rôde près du moulin"
        );
        r.notes.clear();
        r.status = "mort".to_string();
        assert_eq!(render_surveillance_line(&r), "[color=darkred]Jean[/color] (mort)");
    }

    #[test]
    fn test_section_title_with_and_without_count() {
        let style = RenderStyle::default();
        assert_eq!(
            section_title("FLUX MIGRATOIRES", Some(3), &style),
            "[color=#162E5A][size=14][b][u]FLUX MIGRATOIRES[/u] :[/b][/size][/color] [color=blue][b]3[/b][/color]\n"
        );
        assert_eq!(
            section_title("MÉMOIRE ET VISIONS", None, &style),
            "[color=#162E5A][size=14][b][u]MÉMOIRE ET VISIONS[/u] :[/b][/size][/color]\n"
        );
    }

    #[test]
    fn test_count_lines_ignores_blank_lines() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("a\n\n  \nb\n"), 2);
    }

    #[test]
    fn test_block_or_fallback() {
        assert_eq!(block_or(&[], NOTHING_TO_REPORT), "[b]RAS.[/b]");
        assert_eq!(block_or(&["a".to_string(), "b".to_string()], NOTHING_TO_REPORT), "a\nb");
    }
}
