//! Best-effort parser for AI-formatted field notes.
//!
//! Formatted notes contain up to four canonical sections. The formatter is
//! not perfectly consistent: headers arrive with or without `**` emphasis,
//! with varying case, and in any order. This is a splitter over
//! semi-structured text, not a strict grammar; unlabeled content is kept.

use regex::Regex;
use std::sync::OnceLock;

pub const TASKS_PRODUCTIVITY: &str = "TASKS & PRODUCTIVITY";
pub const BARRIERS_BEHAVIORS: &str = "BARRIERS & BEHAVIORS";
pub const INTERVENTIONS: &str = "INTERVENTIONS";
pub const PROGRESS_GOALS: &str = "PROGRESS ON GOALS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Canonical uppercase label, or empty for unlabeled content.
    pub header: String,
    pub content: String,
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\*{0,2}\s*(tasks\s*(?:&|and)?\s*productivity|barriers\s*(?:&|and)?\s*behaviors|interventions|progress\s*(?:on\s*)?goals)\s*:?\s*\*{0,2}:?",
        )
        .expect("narrative header pattern is valid")
    })
}

fn canonical_label(matched: &str) -> String {
    let lowered = matched.to_lowercase();
    if lowered.starts_with("tasks") {
        TASKS_PRODUCTIVITY.to_string()
    } else if lowered.starts_with("barriers") {
        BARRIERS_BEHAVIORS.to_string()
    } else if lowered.starts_with("interventions") {
        INTERVENTIONS.to_string()
    } else {
        PROGRESS_GOALS.to_string()
    }
}

/// Splits a formatted note into labeled sections, preserving input order.
/// Non-empty content is never dropped; chunks that trim to nothing are never
/// emitted.
pub fn parse(note: &str) -> Vec<Section> {
    let re = header_regex();
    let mut sections = Vec::new();
    let mut pending_header: Option<String> = None;
    let mut last_end = 0usize;

    for captures in re.captures_iter(note) {
        let whole = captures.get(0).expect("match always has group 0");
        push_chunk(
            &mut sections,
            pending_header.take(),
            &note[last_end..whole.start()],
        );
        let label = captures.get(1).expect("header group always present");
        pending_header = Some(canonical_label(label.as_str()));
        last_end = whole.end();
    }
    push_chunk(&mut sections, pending_header.take(), &note[last_end..]);

    sections
}

fn push_chunk(sections: &mut Vec<Section>, header: Option<String>, chunk: &str) {
    let content = chunk.trim();
    if content.is_empty() {
        return;
    }
    sections.push(Section {
        header: header.unwrap_or_default(),
        content: content.to_string(),
    });
}
