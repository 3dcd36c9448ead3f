//! Candidate proper-name extraction from free prose
//!
//! Heuristic only: keeps capitalised tokens of three characters or more
//! once BBCode tags are stripped. False positives are expected.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Any bracketed annotation, e.g. `[b]` or `[color=red]`
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());

/// Token separators: comma, newline, semicolon, colon, hyphen, parentheses, brackets
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,\n;:\-\(\)\[\]]+").unwrap());

const MIN_NAME_CHARS: usize = 3;

/// Candidate names found in a single block
pub fn names_in_block(text: &str) -> HashSet<String> {
    let stripped = BRACKETED.replace_all(text, "");
    SEPARATORS
        .split(&stripped)
        .map(str::trim)
        .filter(|token| token.chars().count() >= MIN_NAME_CHARS)
        .filter(|token| token.chars().any(char::is_uppercase))
        .map(str::to_string)
        .collect()
}

/// Deduplicated union of the candidate names of every block
pub fn extract_names<'a, I>(blocks: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    blocks.into_iter().flat_map(names_in_block).collect()
}
