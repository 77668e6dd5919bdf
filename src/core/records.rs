//! Record parser for the "Test Cases" section.
//!
//! The body is cut into blocks at every `Test Case ID:` line. Inside a block
//! the field markers may come in any order; `Steps:` stays open and collects
//! the following lines until the next marker.

use crate::core::normalizer::strip_list_marker;
use crate::core::tables::parse_pipe_table;
use crate::domain::model::{Section, TestCaseRecord};
use regex::Regex;
use std::sync::LazyLock;

static CASE_ID_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[*\-]\s*)?(?:\*\*)?\s*Test\s+Case\s+ID\s*(?:\*\*)?\s*:\s*(?:\*\*)?\s*(?P<value>.*?)\s*(?:\*\*)?\s*$",
    )
    .expect("valid test case id pattern")
});

static FIELD_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[*\-]\s*)?(?:\*\*)?\s*(?P<field>Description|Pre-?conditions?|Steps|Expected\s+Results?|Notes?)\s*(?:\*\*)?\s*:\s*(?:\*\*)?\s*(?P<value>.*?)\s*$",
    )
    .expect("valid field marker pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Description,
    Precondition,
    Steps,
    ExpectedResult,
    Note,
}

impl Field {
    fn from_marker(marker: &str) -> Self {
        let marker = marker.to_ascii_lowercase();
        if marker.starts_with("description") {
            Field::Description
        } else if marker.starts_with("pre") {
            Field::Precondition
        } else if marker.starts_with("steps") {
            Field::Steps
        } else if marker.starts_with("expected") {
            Field::ExpectedResult
        } else {
            Field::Note
        }
    }
}

#[derive(Debug, Default)]
struct BlockOutcome {
    record: TestCaseRecord,
    recognized: bool,
    ignored_lines: usize,
}

pub fn parse_records(section: &Section) -> Vec<TestCaseRecord> {
    // 有 Test Case ID 區塊時一律走區塊解析，表格只是某個欄位的內容
    let has_blocks = section.body.lines().any(|line| CASE_ID_MARKER.is_match(line));
    if let Some(table) = parse_pipe_table(&section.body).filter(|_| !has_blocks) {
        let records: Vec<TestCaseRecord> = table
            .rows
            .into_iter()
            .map(record_from_row)
            .filter(|record| !record.is_empty())
            .collect();
        tracing::debug!("Parsed {} test cases from pipe table", records.len());
        return records;
    }

    let mut records = Vec::new();
    let mut ignored_lines = 0;

    for block in blocks(&section.body) {
        let outcome = parse_block(&block);
        ignored_lines += outcome.ignored_lines;
        // 沒有任何欄位的區塊直接捨棄
        if outcome.recognized && !outcome.record.is_empty() {
            records.push(outcome.record);
        }
    }

    if ignored_lines > 0 {
        tracing::debug!(
            "Ignored {} lines outside of test case fields",
            ignored_lines
        );
    }
    tracing::debug!("Parsed {} test cases", records.len());

    records
}

fn blocks(body: &str) -> Vec<Vec<&str>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in body.lines().filter(|line| !line.trim().is_empty()) {
        if CASE_ID_MARKER.is_match(line) && !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn parse_block(lines: &[&str]) -> BlockOutcome {
    let mut outcome = BlockOutcome::default();
    let mut steps: Vec<String> = Vec::new();
    let mut in_steps = false;

    for line in lines {
        if let Some(captures) = CASE_ID_MARKER.captures(line) {
            outcome.record.id = captures["value"].to_string();
            outcome.recognized = true;
            in_steps = false;
            continue;
        }

        if let Some(captures) = FIELD_MARKER.captures(line) {
            let value = captures["value"].to_string();
            outcome.recognized = true;
            in_steps = false;

            match Field::from_marker(&captures["field"]) {
                Field::Description => outcome.record.description = value,
                Field::Precondition => outcome.record.precondition = value,
                Field::ExpectedResult => outcome.record.expected_result = value,
                Field::Note => outcome.record.note = value,
                Field::Steps => {
                    in_steps = true;
                    push_step(&mut steps, &value);
                }
            }
            continue;
        }

        if in_steps {
            push_step(&mut steps, line);
        } else {
            outcome.ignored_lines += 1;
        }
    }

    outcome.record.steps = steps.join("\n");
    outcome
}

fn push_step(steps: &mut Vec<String>, line: &str) {
    let step = strip_list_marker(line);
    if !step.is_empty() {
        steps.push(step.to_string());
    }
}

/// 表格列依 Test Cases 欄位順序對應
fn record_from_row(row: Vec<String>) -> TestCaseRecord {
    let mut cells = row.into_iter();
    let mut next = || cells.next().unwrap_or_default();

    let id = next();
    let description = next();
    let precondition = next();
    let steps = next()
        .lines()
        .map(strip_list_marker)
        .filter(|step| !step.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let expected_result = next();
    let note = next();

    TestCaseRecord {
        id,
        description,
        precondition,
        steps,
        expected_result,
        note,
    }
}
