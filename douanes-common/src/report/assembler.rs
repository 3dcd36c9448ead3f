//! Final document assembly
//!
//! Deterministic: the same fields, village, day and style always give the
//! same bytes. Persisting the result is the caller's job.

use chrono::NaiveDate;

use super::parser::{parse_field, MEMORY_SLOTS, SURVEILLANCE_SLOTS};
use super::render::{
    block_or, count_lines, render_memory_line, render_surveillance_line, section_title,
    RenderStyle, LEGEND, NOTHING_TO_REPORT, WATCH_NOT_PERFORMED,
};
use super::RawFields;

/// Report sections, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    MemoryVisions,
    Surveillance,
    MigratoryFlows,
    ForeignPresence,
    LocalPresence,
    ArmedGroups,
    VillagersAndMoves,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::MemoryVisions,
        Section::Surveillance,
        Section::MigratoryFlows,
        Section::ForeignPresence,
        Section::LocalPresence,
        Section::ArmedGroups,
        Section::VillagersAndMoves,
    ];

    /// Banner label
    pub fn label(self) -> &'static str {
        match self {
            Section::MemoryVisions => "MÉMOIRE ET VISIONS",
            Section::Surveillance => "PERSONNES EN SURVEILLANCE",
            Section::MigratoryFlows => "FLUX MIGRATOIRES",
            Section::ForeignPresence => "PRÉSENCES ÉTRANGÈRES",
            Section::LocalPresence => "PRÉSENCES ARMAGNACAISES & COMMINGEOISES",
            Section::ArmedGroups => "ARMÉES ET GROUPES",
            Section::VillagersAndMoves => "LISTE DES VILLAGEOIS & DÉMÉNAGEMENTS",
        }
    }

    /// Whether the banner carries a line count
    pub fn is_counted(self) -> bool {
        !matches!(self, Section::MemoryVisions | Section::VillagersAndMoves)
    }
}

/// Forum date, e.g. "07 March 2024"
pub fn format_report_date(day: NaiveDate) -> String {
    day.format("%d %B %Y").to_string()
}

/// Non-blank lines of a free-text field, trimmed
fn passthrough_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render the full report document
pub fn compose(
    village: &str,
    day: NaiveDate,
    fields: &RawFields,
    watch_performed: bool,
    style: &RenderStyle,
) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(16);

    lines.push(format!(
        "[quote][center][b][size=18]{}[/size]\nRapport de la maréchaussée du {}.[/b][/center]\n",
        village,
        format_report_date(day)
    ));

    // Counts are taken from the emitted block, placeholder included
    let mut push_section = |section: Section, block: String| {
        let count = section.is_counted().then(|| count_lines(&block));
        lines.push(section_title(section.label(), count, style));
        lines.push(format!("{}\n\n", block));
    };

    let memory: Vec<String> = parse_field(&fields.mem_visions, MEMORY_SLOTS)
        .iter()
        .map(render_memory_line)
        .collect();
    // The notice only replaces an empty field; unparseable input reads as RAS
    let memory_fallback = if !watch_performed && fields.mem_visions.trim().is_empty() {
        WATCH_NOT_PERFORMED
    } else {
        NOTHING_TO_REPORT
    };
    push_section(Section::MemoryVisions, block_or(&memory, memory_fallback));

    let surveillance: Vec<String> = parse_field(&fields.surveillance, SURVEILLANCE_SLOTS)
        .iter()
        .map(render_surveillance_line)
        .collect();
    push_section(Section::Surveillance, block_or(&surveillance, NOTHING_TO_REPORT));

    for (section, raw) in [
        (Section::MigratoryFlows, &fields.flux),
        (Section::ForeignPresence, &fields.foreigners),
        (Section::LocalPresence, &fields.ac_presence),
        (Section::ArmedGroups, &fields.armies_groups),
    ] {
        push_section(section, block_or(&passthrough_lines(raw), NOTHING_TO_REPORT));
    }

    let moves = block_or(&passthrough_lines(&fields.moves), NOTHING_TO_REPORT);
    let villagers = block_or(&passthrough_lines(&fields.villagers), NOTHING_TO_REPORT);
    let block = format!(
        "[spoiler][quote]Déménagements[/quote]\n{}\n{}\n[/spoiler]",
        moves, villagers
    );
    push_section(Section::VillagersAndMoves, block);

    lines.push(format!("{}\n[/quote]", LEGEND));
    lines.join("\n")
}
