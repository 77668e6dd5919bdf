use super::xlsx::workbook_sheets;
use super::{list_items, render_error, resolved_sections, text_or_fallback, Renderer};
use crate::domain::model::{
    DocumentKind, FieldValue, OutputFormat, RenderableDocument, TestCaseRecord,
};
use crate::utils::error::Result;

/// 測試案例文件輸出 Test Cases 工作表，其他文件每個項目一列 (Section, Item)
pub fn csv_rows(document: &RenderableDocument) -> (Vec<String>, Vec<Vec<String>>) {
    if document.kind == DocumentKind::TestCases {
        if let Some(sheet) = workbook_sheets(document)
            .into_iter()
            .find(|sheet| sheet.name == "Test Cases")
        {
            let rows = sheet
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.as_text()).collect())
                .collect();
            return (sheet.columns, rows);
        }
        return (
            TestCaseRecord::COLUMNS.iter().map(|c| c.to_string()).collect(),
            Vec::new(),
        );
    }

    let mut rows = Vec::new();
    for (label, value) in resolved_sections(document) {
        let section = document.kind.section_title(label).to_string();
        match value.as_ref() {
            FieldValue::Text(text) => {
                rows.push(vec![section, text_or_fallback(label, text).trim().to_string()]);
            }
            FieldValue::List(items) => {
                for item in list_items(label, items) {
                    rows.push(vec![section.clone(), item.trim().to_string()]);
                }
            }
            FieldValue::Table(table) if table.rows.is_empty() => {
                rows.push(vec![section, label.fallback().to_string()]);
            }
            FieldValue::Table(table) => {
                for row in &table.rows {
                    rows.push(vec![section.clone(), row.join(" | ")]);
                }
            }
            FieldValue::TestCases(records) if records.is_empty() => {
                rows.push(vec![section, label.fallback().to_string()]);
            }
            FieldValue::TestCases(records) => {
                for record in records {
                    rows.push(vec![section.clone(), record.id.clone()]);
                }
            }
        }
    }

    (vec!["Section".to_string(), "Item".to_string()], rows)
}

pub struct CsvRenderer;

impl Renderer for CsvRenderer {
    fn render(&self, document: &RenderableDocument) -> Result<Vec<u8>> {
        let (headers, rows) = csv_rows(document);

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&headers)?;
        for row in &rows {
            writer.write_record(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| render_error(OutputFormat::Csv, e.error().to_string()))?;
        tracing::debug!("Wrote {} CSV rows", rows.len());

        Ok(bytes)
    }
}
