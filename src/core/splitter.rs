//! Section splitter: cuts a raw model response into labeled sections.
//!
//! A line opens a new section when it is one of the vocabulary headings,
//! optionally written as a markdown heading, a bullet or in bold, followed
//! by the end of the line or by a colon, with at most a short qualifier in
//! between (`Action Items - pending:`). Text after the colon starts the body.

use crate::domain::model::{Section, SectionLabel, Vocabulary};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// 標題與冒號之間允許的補充說明長度，例如 `Attendees (3):`
const MAX_QUALIFIER: usize = 40;

static HEADING_PATTERNS: LazyLock<HashMap<SectionLabel, Regex>> = LazyLock::new(|| {
    SectionLabel::ALL
        .iter()
        .map(|label| (*label, heading_regex(label.headings())))
        .collect()
});

fn heading_regex(phrases: &[&str]) -> Regex {
    let alternatives = phrases
        .iter()
        .map(|phrase| {
            phrase
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|");

    let pattern = format!(
        r"(?i)^\s*(?:#{{1,6}}\s*)?(?:[*\-]\s+)?(?:\*\*)?\s*(?:{})\b(?:\s*(?:\*\*)?\s*$|[^:\n]{{0,{}}}?:\s*(?:\*\*)?\s*(?P<rest>.*?)\s*$)",
        alternatives, MAX_QUALIFIER
    );
    Regex::new(&pattern).expect("heading pattern is built from escaped literals")
}

/// 判斷該行是否為字彙表中的標題，回傳標籤與冒號後的內容
fn match_heading<'a>(line: &'a str, vocabulary: &Vocabulary) -> Option<(SectionLabel, &'a str)> {
    vocabulary.labels().iter().find_map(|label| {
        let pattern = HEADING_PATTERNS.get(label)?;
        let captures = pattern.captures(line)?;
        let rest = captures.name("rest").map(|m| m.as_str()).unwrap_or("");
        Some((*label, rest))
    })
}

pub fn split(raw: &str, vocabulary: &Vocabulary) -> Vec<Section> {
    let mut sections = Vec::new();
    // None 代表第一個標題之前的內容
    let mut current: Option<SectionLabel> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in raw.lines() {
        match match_heading(line, vocabulary) {
            Some((label, rest)) => {
                flush(&mut sections, current, &buffer, vocabulary);
                current = Some(label);
                buffer.clear();
                if !rest.is_empty() {
                    buffer.push(rest);
                }
            }
            None => buffer.push(line),
        }
    }
    flush(&mut sections, current, &buffer, vocabulary);

    if sections.is_empty() {
        sections.push(Section::new(vocabulary.fallback(), raw.trim()));
    }

    tracing::debug!(
        "Split response into {} sections: {:?}",
        sections.len(),
        sections.iter().map(|s| s.label).collect::<Vec<_>>()
    );

    sections
}

fn flush(
    sections: &mut Vec<Section>,
    current: Option<SectionLabel>,
    buffer: &[&str],
    vocabulary: &Vocabulary,
) {
    let body = buffer.join("\n").trim().to_string();
    match current {
        Some(label) => sections.push(Section::new(label, body)),
        None if !body.is_empty() => sections.push(Section::new(vocabulary.fallback(), body)),
        None => {}
    }
}
