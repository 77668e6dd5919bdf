//! Markdown pipe tables inside section bodies.
//!
//! Column headers shown in the output always come from [`column_headers`],
//! the header row written by the model is only used to locate the table.

use crate::domain::model::{SectionLabel, TableField, TestCaseRecord};
use regex::Regex;
use std::sync::LazyLock;

static SEPARATOR_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\|?\s*:?-{3,}:?\s*(?:\|\s*:?-{3,}:?\s*)*\|?$").expect("valid separator pattern")
});

static CELL_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line break pattern"));

/// 各區段固定的表格欄位
pub fn column_headers(label: SectionLabel) -> Option<&'static [&'static str]> {
    match label {
        SectionLabel::Attendees => Some(&["Name", "Role"]),
        SectionLabel::ActionItems => Some(&["Action Item", "Owner", "Due Date"]),
        SectionLabel::DiscussionPoints => Some(&["Topic", "Details"]),
        SectionLabel::NextSteps => Some(&["Next Step", "Owner", "Target Date"]),
        SectionLabel::TestScenarios => Some(&["Scenario ID", "Scenario"]),
        SectionLabel::TestCases => Some(&TestCaseRecord::COLUMNS),
        SectionLabel::Requirements => Some(&["Requirement ID", "Requirement", "Priority"]),
        SectionLabel::KeyStakeholders => Some(&["Stakeholder", "Role", "Responsibility"]),
        SectionLabel::Overview
        | SectionLabel::MeetingSummary
        | SectionLabel::ProjectObjective
        | SectionLabel::ProjectScope => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// 表格在內文中的行範圍 (含標題列與分隔列)
    pub lines: std::ops::Range<usize>,
}

fn is_table_row(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('|') && line.len() > 1
}

fn cells(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|')
        .map(|cell| CELL_BREAK.replace_all(cell.trim(), "\n").trim().to_string())
        .collect()
}

/// 單一資料列的文字，非空白儲存格以 " | " 串接
pub fn row_text(line: &str) -> String {
    cells(line)
        .into_iter()
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// 找出內文中第一個含資料列的 pipe table
pub fn parse_pipe_table(body: &str) -> Option<PipeTable> {
    let lines: Vec<&str> = body.lines().collect();

    for (index, window) in lines.windows(2).enumerate() {
        if !is_table_row(window[0]) || !SEPARATOR_ROW.is_match(window[1].trim()) {
            continue;
        }

        let row_lines = lines[index + 2..]
            .iter()
            .take_while(|line| is_table_row(line))
            .count();
        let rows: Vec<Vec<String>> = lines[index + 2..index + 2 + row_lines]
            .iter()
            .map(|line| cells(line))
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();

        if rows.is_empty() {
            return None;
        }

        return Some(PipeTable {
            header: cells(window[0]),
            rows,
            lines: index..index + 2 + row_lines,
        });
    }

    None
}

/// 把一列調整成指定欄數：不足補空字串，多出的欄位併入最後一欄
fn fit_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    if row.len() > width && width > 0 {
        let overflow = row.split_off(width - 1);
        row.push(overflow.join(" | "));
    }
    row.resize(width, String::new());
    row
}

/// 表格以外最多只能有一行前言，其餘內容都在表格裡
pub fn is_whole_table(body: &str, table: &PipeTable) -> bool {
    let mut outside = body
        .lines()
        .enumerate()
        .filter(|(index, line)| !table.lines.contains(index) && !line.trim().is_empty());

    match outside.next() {
        None => true,
        Some((index, _)) => index < table.lines.start && outside.next().is_none(),
    }
}

/// 區段有固定欄位且內文只有一個表格時，轉成 TableField
pub fn table_field(label: SectionLabel, body: &str) -> Option<TableField> {
    let headers = column_headers(label)?;
    let table = parse_pipe_table(body)?;

    if !is_whole_table(body, &table) {
        tracing::debug!(
            "{} section mixes a pipe table with other lines, keeping it as a list",
            label
        );
        return None;
    }

    tracing::debug!(
        "Detected pipe table in {} section with {} rows",
        label,
        table.rows.len()
    );

    Some(TableField {
        headers: headers.iter().map(|h| h.to_string()).collect(),
        rows: table
            .rows
            .into_iter()
            .map(|row| fit_row(row, headers.len()))
            .collect(),
    })
}
