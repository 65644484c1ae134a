//! Deterministic scrubbing of backend output and user-facing labels.
//!
//! The model occasionally misspells its own name, leaks the wrong language,
//! or collapses paragraphs into single line breaks. These corrections are
//! fixed tables applied after every backend call.

use regex_lite::Regex;
use tracing::warn;

use crate::dialogue::Lang;

/// Persistent misspellings the model keeps producing.
const TYPO_CORRECTIONS: &[(&str, &str)] = &[
    ("안하세요", "안녕하세요"),
    ("이리스 입니다", "이리스입니다"),
    ("이리스입 니다", "이리스입니다"),
];

/// Phrases that disqualify a user-supplied display label.
const LABEL_INJECTION_PATTERNS: &[&str] = &[
    "ignore previous",
    "ignore above",
    "disregard",
    "forget your instructions",
    "new instructions",
    "system prompt",
    "you are now",
    "act as",
    "pretend to be",
];

const MAX_LABEL_CHARS: usize = 24;

pub fn default_label(lang: Lang) -> &'static str {
    match lang {
        Lang::Ko => "로터스",
        Lang::En => "Lotus",
    }
}

/// Apply the full scrub pipeline to raw backend output.
pub fn scrub_reply(text: &str, lang: Lang) -> String {
    let corrected = correct_typos(text);
    let stripped = strip_language_leak(&corrected, lang);
    normalize_line_breaks(&stripped)
}

pub fn correct_typos(text: &str) -> String {
    let mut result = text.to_string();
    for (wrong, right) in TYPO_CORRECTIONS {
        result = result.replace(wrong, right);
    }
    result
}

/// Collapse every run of line breaks to a paragraph break.
///
/// The docent is instructed to separate paragraphs with double line breaks
/// and never break inside one; this forces the rule when the model forgets.
pub fn normalize_line_breaks(text: &str) -> String {
    let unified = text.replace("\r\n", "\n");
    let paragraphs: Vec<&str> = unified
        .split('\n')
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    paragraphs.join("\n\n")
}

/// Drop lines written in the wrong script for the session language.
///
/// Lines that carry the structured summary block are kept regardless, so
/// stripping never interferes with its extraction.
pub fn strip_language_leak(text: &str, lang: Lang) -> String {
    text.lines()
        .filter(|line| {
            if is_structural_line(line) {
                return true;
            }
            match lang {
                Lang::En => !contains_hangul(line),
                Lang::Ko => !is_latin_prose(line),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_structural_line(line: &str) -> bool {
    line.contains('{') || line.contains('}') || line.contains("```")
}

fn contains_hangul(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c, '\u{AC00}'..='\u{D7A3}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}')
    })
}

/// A line counts as Latin prose when it has alphabetic words but no Hangul.
fn is_latin_prose(line: &str) -> bool {
    if contains_hangul(line) {
        return false;
    }
    match Regex::new(r"[A-Za-z]{2,}\s+[A-Za-z]{2,}") {
        Ok(re) => re.is_match(line),
        Err(_) => false,
    }
}

/// Validate and trim a user-supplied display label.
///
/// Control characters are removed, overlong labels are cut at a fixed
/// fixed length, and anything resembling an instruction override falls
/// back to the default label for the session language.
pub fn sanitize_label(raw: Option<&str>, lang: Lang) -> String {
    let Some(raw) = raw else {
        return default_label(lang).to_string();
    };

    let cleaned: String = raw.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return default_label(lang).to_string();
    }

    let lowered = cleaned.to_lowercase();
    if LABEL_INJECTION_PATTERNS.iter().any(|p| lowered.contains(p)) {
        warn!("rejected display label resembling an instruction override");
        return default_label(lang).to_string();
    }

    cleaned.chars().take(MAX_LABEL_CHARS).collect()
}
