use crate::core::tables::{parse_pipe_table, row_text};
use crate::domain::model::{ListField, Section};
use std::borrow::Cow;
use regex::Regex;
use std::sync::LazyLock;

/// 行首的單一項目符號或編號，例如 `* `、`- `、`1. `、`2) `
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[*\-]|\d+[.)])(?:\s+|$)").expect("valid list marker pattern")
});

/// 模型用來表示「沒有內容」的句子
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)not\s+discussed|^no\b.*\blisted\b|^n/?a\.?$|^not\s+applicable\.?$|^not\s+provided\.?$|insufficient\s+details",
    )
    .expect("valid placeholder pattern")
});

pub fn strip_list_marker(line: &str) -> &str {
    match LIST_MARKER.find(line) {
        Some(marker) => line[marker.end()..].trim(),
        None => line.trim(),
    }
}

pub fn is_placeholder(item: &str) -> bool {
    PLACEHOLDER.is_match(item.trim())
}

/// 清單型區段轉成項目清單；結果為空時回傳單一替代字串
///
/// 夾在清單中的 pipe table 每個資料列成為一個項目，標題列與分隔列略過。
pub fn normalize(section: &Section) -> ListField {
    let table = parse_pipe_table(&section.body).map(|table| table.lines);

    let items: ListField = section
        .body
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match &table {
            Some(lines) if lines.contains(&index) => {
                (index >= lines.start + 2).then(|| Cow::Owned(row_text(line)))
            }
            _ => Some(Cow::Borrowed(strip_list_marker(line))),
        })
        .filter(|item| !item.is_empty() && !is_placeholder(item))
        .map(Cow::into_owned)
        .collect();

    if items.is_empty() {
        tracing::debug!("{} section is empty, using fallback", section.label);
        return vec![section.label.fallback().to_string()];
    }

    items
}

/// 純文字區段 (摘要、目標等)：保留內文，整段都是佔位句時回傳替代字串
pub fn normalize_text(section: &Section) -> String {
    let meaningful = section
        .body
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && !is_placeholder(strip_list_marker(line)));

    if meaningful {
        section.body.trim().to_string()
    } else {
        section.label.fallback().to_string()
    }
}
