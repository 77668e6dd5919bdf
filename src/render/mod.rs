//! Renderers from [`RenderableDocument`] to output artifacts.
//!
//! Every renderer walks the document kind's layout, so a section missing from
//! the document is rendered with its fallback text instead of being skipped.

pub mod csv_export;
pub mod docx;
pub mod html;
pub mod xlsx;
pub mod xml;

pub use html::render_html;

use crate::core::assemble::placeholder_value;
use crate::domain::model::{
    Artifact, DocumentKind, FieldValue, OutputFormat, RenderableDocument, SectionLabel,
};
use crate::utils::error::{DocGenError, Result};
use crate::utils::validation::{validate_hex_color, validate_non_empty_string, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// 輸出樣式：標題色、內文色 (不含 #) 與字型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub heading_color: String,
    pub body_color: String,
    pub font: String,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            heading_color: "333333".to_string(),
            body_color: "666666".to_string(),
            font: "Arial".to_string(),
        }
    }
}

impl Validate for RenderStyle {
    fn validate(&self) -> Result<()> {
        validate_hex_color("style.heading_color", &self.heading_color)?;
        validate_hex_color("style.body_color", &self.body_color)?;
        validate_non_empty_string("style.font", &self.font)?;
        Ok(())
    }
}

pub trait Renderer {
    fn render(&self, document: &RenderableDocument) -> Result<Vec<u8>>;
}

pub fn renderer_for(format: OutputFormat, style: &RenderStyle) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Html => Box::new(html::HtmlRenderer),
        OutputFormat::Doc => Box::new(html::WordHtmlRenderer::new(style.clone())),
        OutputFormat::Docx => Box::new(docx::DocxRenderer::new(style.clone())),
        OutputFormat::Xlsx => Box::new(xlsx::XlsxRenderer),
        OutputFormat::Csv => Box::new(csv_export::CsvRenderer),
    }
}

pub fn render(
    document: &RenderableDocument,
    format: OutputFormat,
    style: &RenderStyle,
) -> Result<Artifact> {
    render_on(document, format, style, chrono::Local::now().date_naive())
}

/// 指定檔名日期的版本
pub fn render_on(
    document: &RenderableDocument,
    format: OutputFormat,
    style: &RenderStyle,
    date: NaiveDate,
) -> Result<Artifact> {
    let renderer = renderer_for(format, style);
    let bytes = renderer.render(document)?;
    let file_name = artifact_file_name(document.kind, format, date);

    tracing::info!("📄 Rendered {} ({} bytes)", file_name, bytes.len());

    Ok(Artifact {
        format,
        file_name,
        bytes,
    })
}

/// 測試案例檔名帶日期 (TestCases_20250520.xlsx)，其他文件使用固定檔名
pub fn artifact_file_name(kind: DocumentKind, format: OutputFormat, date: NaiveDate) -> String {
    match kind {
        DocumentKind::TestCases => format!(
            "{}_{}.{}",
            kind.file_stem(),
            date.format("%Y%m%d"),
            format.extension()
        ),
        _ => format!("{}.{}", kind.file_stem(), format.extension()),
    }
}

/// 依文件版面取出各區段的值，缺少的區段以預設內容補上
pub(crate) fn resolved_sections(
    document: &RenderableDocument,
) -> Vec<(SectionLabel, Cow<'_, FieldValue>)> {
    document
        .kind
        .layout()
        .iter()
        .map(|(label, shape)| {
            let value = match document.get(*label) {
                Some(value) => Cow::Borrowed(value),
                None => Cow::Owned(placeholder_value(*label, *shape)),
            };
            (*label, value)
        })
        .collect()
}

/// 列表為空時回傳單一預設項目
pub(crate) fn list_items(label: SectionLabel, items: &[String]) -> Vec<&str> {
    let items: Vec<&str> = items
        .iter()
        .map(|item| item.as_str())
        .filter(|item| !item.trim().is_empty())
        .collect();
    if items.is_empty() {
        vec![label.fallback()]
    } else {
        items
    }
}

pub(crate) fn text_or_fallback(label: SectionLabel, text: &str) -> &str {
    if text.trim().is_empty() {
        label.fallback()
    } else {
        text
    }
}

pub(crate) fn render_error(format: OutputFormat, message: impl Into<String>) -> DocGenError {
    DocGenError::RenderError {
        format: format.to_string(),
        message: message.into(),
    }
}
