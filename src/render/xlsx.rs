//! SpreadsheetML (.xlsx) writer.
//!
//! Test-case documents always produce the `Overview`, `Scenarios` and
//! `Test Cases` sheets with fixed columns. Other kinds get one sheet per
//! section. Cells are written as inline strings so no shared string table
//! is needed.

use super::xml::{core_properties, escape_xml, write_package, XML_DECLARATION};
use super::{list_items, resolved_sections, text_or_fallback, Renderer};
use crate::domain::model::{
    DocumentKind, FieldValue, RenderableDocument, SectionLabel, TableField, TestCaseRecord,
};
use crate::utils::error::Result;

const STYLES: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0" applyAlignment="1"><alignment vertical="top" wrapText="1"/></xf></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

const HEADER_STYLE: u8 = 1;
const WRAP_STYLE: u8 = 2;

const MIN_COLUMN_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Number(u64),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: sheet_name(name),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// 工作表名稱最多 31 字元，且不可含 []:*?/\
fn sheet_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect()
}

/// 0 → A, 25 → Z, 26 → AA
pub fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

pub fn workbook_sheets(document: &RenderableDocument) -> Vec<Sheet> {
    let sections = resolved_sections(document);

    match document.kind {
        DocumentKind::TestCases => {
            let mut overview = Sheet::new("Overview", &["Overview"]);
            let mut scenarios = Sheet::new("Scenarios", &["Scenario Number", "Scenario"]);
            let mut cases = Sheet::new("Test Cases", &TestCaseRecord::COLUMNS);

            for (label, value) in &sections {
                match label {
                    SectionLabel::Overview => overview.rows = text_rows(*label, value),
                    SectionLabel::TestScenarios => fill_scenarios_sheet(&mut scenarios, *label, value),
                    SectionLabel::TestCases => fill_records_sheet(&mut cases, *label, value),
                    _ => {}
                }
            }

            vec![overview, scenarios, cases]
        }
        _ => sections
            .iter()
            .map(|(label, value)| {
                let title = document.kind.section_title(*label);
                match value.as_ref() {
                    FieldValue::Text(_) => {
                        let mut sheet = Sheet::new(title, &[title]);
                        sheet.rows = text_rows(*label, value);
                        sheet
                    }
                    FieldValue::List(_) | FieldValue::Table(_) => {
                        let mut sheet = Sheet::new(title, &["No.", title]);
                        fill_list_sheet(&mut sheet, *label, value);
                        sheet
                    }
                    FieldValue::TestCases(_) => {
                        let mut sheet = Sheet::new(title, &TestCaseRecord::COLUMNS);
                        fill_records_sheet(&mut sheet, *label, value);
                        sheet
                    }
                }
            })
            .collect(),
    }
}

fn text_rows(label: SectionLabel, value: &FieldValue) -> Vec<Vec<CellValue>> {
    let text = match value {
        FieldValue::Text(text) => text_or_fallback(label, text).trim().to_string(),
        FieldValue::List(items) => list_items(label, items).join("\n"),
        FieldValue::Table(table) => table_lines(table).join("\n"),
        FieldValue::TestCases(records) => records
            .iter()
            .map(|record| record.id.clone())
            .collect::<Vec<_>>()
            .join("\n"),
    };
    vec![vec![CellValue::Text(text_or_fallback(label, &text).to_string())]]
}

fn table_lines(table: &TableField) -> Vec<String> {
    table.rows.iter().map(|row| row.join(" | ")).collect()
}

/// 列表逐項編號；表格欄位直接沿用其欄名與資料列
fn fill_list_sheet(sheet: &mut Sheet, label: SectionLabel, value: &FieldValue) {
    match value {
        FieldValue::Table(table) => {
            sheet.columns = table.headers.clone();
            sheet.rows = table
                .rows
                .iter()
                .map(|row| row.iter().cloned().map(CellValue::Text).collect())
                .collect();
            if sheet.rows.is_empty() {
                sheet.rows.push(vec![CellValue::text(label.fallback())]);
            }
        }
        FieldValue::List(items) => {
            sheet.rows = numbered(list_items(label, items));
        }
        FieldValue::Text(text) => {
            sheet.rows = numbered(vec![text_or_fallback(label, text).trim()]);
        }
        FieldValue::TestCases(_) => {
            sheet.rows = numbered(vec![label.fallback()]);
        }
    }
}

/// Scenarios 工作表欄位固定；表格的第一欄當編號，其餘併成情境內容
fn fill_scenarios_sheet(sheet: &mut Sheet, label: SectionLabel, value: &FieldValue) {
    match value {
        FieldValue::Table(table) if !table.rows.is_empty() => {
            sheet.rows = table
                .rows
                .iter()
                .enumerate()
                .map(|(index, row)| {
                    let number = match row.first().map(|cell| cell.trim()) {
                        Some(id) if !id.is_empty() => CellValue::text(id),
                        _ => CellValue::Number(index as u64 + 1),
                    };
                    let scenario = row
                        .iter()
                        .skip(1)
                        .map(|cell| cell.trim())
                        .filter(|cell| !cell.is_empty())
                        .collect::<Vec<_>>()
                        .join(" | ");
                    vec![number, CellValue::Text(scenario)]
                })
                .collect();
        }
        FieldValue::Table(_) => sheet.rows = numbered(vec![label.fallback()]),
        _ => fill_list_sheet(sheet, label, value),
    }
}

fn numbered(items: Vec<&str>) -> Vec<Vec<CellValue>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| vec![CellValue::Number(index as u64 + 1), CellValue::text(item)])
        .collect()
}

fn fill_records_sheet(sheet: &mut Sheet, label: SectionLabel, value: &FieldValue) {
    let records: &[TestCaseRecord] = match value {
        FieldValue::TestCases(records) => records.as_slice(),
        _ => &[],
    };

    sheet.rows = records
        .iter()
        .map(|record| record.cells().into_iter().map(CellValue::text).collect())
        .collect();

    if sheet.rows.is_empty() {
        let mut row = vec![CellValue::text("N/A"), CellValue::text(label.fallback())];
        row.resize(TestCaseRecord::COLUMNS.len(), CellValue::text(""));
        sheet.rows.push(row);
    }
}

fn cell_xml(reference: &str, value: &CellValue, style: u8) -> String {
    match value {
        CellValue::Number(number) => {
            format!(r#"<c r="{}" s="{}"><v>{}</v></c>"#, reference, style, number)
        }
        CellValue::Text(text) => format!(
            r#"<c r="{}" s="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            reference,
            style,
            escape_xml(text)
        ),
    }
}

fn column_widths(sheet: &Sheet) -> Vec<usize> {
    (0..sheet.columns.len())
        .map(|index| {
            let header = sheet.columns[index].chars().count();
            let widest = sheet
                .rows
                .iter()
                .filter_map(|row| row.get(index))
                .flat_map(|cell| {
                    cell.as_text()
                        .lines()
                        .map(|line| line.chars().count())
                        .collect::<Vec<_>>()
                })
                .max()
                .unwrap_or(0);
            (header.max(widest) + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}

pub fn sheet_xml(sheet: &Sheet) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);

    let widths = column_widths(sheet);
    if !widths.is_empty() {
        xml.push_str("<cols>");
        for (index, width) in widths.iter().enumerate() {
            xml.push_str(&format!(
                r#"<col min="{0}" max="{0}" width="{1}" customWidth="1"/>"#,
                index + 1,
                width
            ));
        }
        xml.push_str("</cols>");
    }

    xml.push_str("<sheetData>");
    xml.push_str(r#"<row r="1">"#);
    for (index, column) in sheet.columns.iter().enumerate() {
        let reference = format!("{}1", column_name(index));
        xml.push_str(&cell_xml(&reference, &CellValue::text(column.as_str()), HEADER_STYLE));
    }
    xml.push_str("</row>");

    for (row_index, row) in sheet.rows.iter().enumerate() {
        let row_number = row_index + 2;
        xml.push_str(&format!(r#"<row r="{}">"#, row_number));
        for (index, value) in row.iter().enumerate() {
            let reference = format!("{}{}", column_name(index), row_number);
            xml.push_str(&cell_xml(&reference, value, WRAP_STYLE));
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");

    xml
}

fn workbook_xml(sheets: &[Sheet]) -> String {
    let mut xml = format!(
        r#"{}<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
        XML_DECLARATION
    );
    for (index, sheet) in sheets.iter().enumerate() {
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(&sheet.name),
            index + 1,
            index + 1
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels(sheet_count: usize) -> String {
    let mut xml = format!(
        r#"{}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        XML_DECLARATION
    );
    for index in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{0}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{0}.xml"/>"#,
            index
        ));
    }
    xml.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheet_count + 1
    ));
    xml.push_str("</Relationships>");
    xml
}

fn content_types(sheet_count: usize) -> String {
    let mut xml = format!(
        r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
        XML_DECLARATION
    );
    for index in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            index
        ));
    }
    xml.push_str("</Types>");
    xml
}

const PACKAGE_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

pub struct XlsxRenderer;

impl Renderer for XlsxRenderer {
    fn render(&self, document: &RenderableDocument) -> Result<Vec<u8>> {
        let sheets = workbook_sheets(document);
        tracing::debug!(
            "Writing workbook with sheets: {:?}",
            sheets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
        );

        let mut entries = vec![
            ("[Content_Types].xml".to_string(), content_types(sheets.len())),
            (
                "_rels/.rels".to_string(),
                format!("{}{}", XML_DECLARATION, PACKAGE_RELS),
            ),
            (
                "docProps/core.xml".to_string(),
                core_properties(document.title()),
            ),
            ("xl/workbook.xml".to_string(), workbook_xml(&sheets)),
            (
                "xl/_rels/workbook.xml.rels".to_string(),
                workbook_rels(sheets.len()),
            ),
            (
                "xl/styles.xml".to_string(),
                format!("{}{}", XML_DECLARATION, STYLES),
            ),
        ];
        for (index, sheet) in sheets.iter().enumerate() {
            entries.push((
                format!("xl/worksheets/sheet{}.xml", index + 1),
                sheet_xml(sheet),
            ));
        }

        write_package(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DocumentMeta;
    use std::io::Read;

    fn empty(kind: DocumentKind) -> RenderableDocument {
        RenderableDocument::new(kind, DocumentMeta::for_kind(kind))
    }

    #[test]
    fn test_scenarios_table_keeps_fixed_columns() {
        let mut document = empty(DocumentKind::TestCases);
        document.insert(
            SectionLabel::TestScenarios,
            FieldValue::Table(TableField {
                headers: vec!["Scenario ID".to_string(), "Scenario".to_string()],
                rows: vec![
                    vec!["S1".to_string(), "Valid login".to_string()],
                    vec!["".to_string(), "Locked account".to_string()],
                ],
            }),
        );

        let sheets = workbook_sheets(&document);
        let scenarios = &sheets[1];
        assert_eq!(scenarios.name, "Scenarios");
        assert_eq!(scenarios.columns, vec!["Scenario Number", "Scenario"]);
        assert_eq!(
            scenarios.rows,
            vec![
                vec![CellValue::text("S1"), CellValue::text("Valid login")],
                vec![CellValue::Number(2), CellValue::text("Locked account")],
            ]
        );
    }

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_empty_test_case_set_has_placeholder_row() {
        let sheets = workbook_sheets(&empty(DocumentKind::TestCases));
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Overview", "Scenarios", "Test Cases"]);

        let cases = &sheets[2];
        assert_eq!(cases.columns, TestCaseRecord::COLUMNS.to_vec());
        assert_eq!(cases.rows.len(), 1);
        assert_eq!(cases.rows[0][0], CellValue::text("N/A"));
        assert_eq!(cases.rows[0][1], CellValue::text("No test cases listed."));
        assert_eq!(cases.rows[0].len(), 6);

        assert_eq!(
            sheets[1].rows,
            vec![vec![CellValue::Number(1), CellValue::text("No scenarios listed.")]]
        );
        assert_eq!(
            sheets[0].rows,
            vec![vec![CellValue::text("No overview provided.")]]
        );
    }

    #[test]
    fn test_records_fill_test_cases_sheet() {
        let mut document = empty(DocumentKind::TestCases);
        document.insert(
            SectionLabel::TestScenarios,
            FieldValue::List(vec!["Valid login".to_string(), "Invalid login".to_string()]),
        );
        document.insert(
            SectionLabel::TestCases,
            FieldValue::TestCases(vec![TestCaseRecord {
                id: "TC001".to_string(),
                description: "X".to_string(),
                precondition: "Y".to_string(),
                steps: "A\nB".to_string(),
                expected_result: "Z".to_string(),
                note: String::new(),
            }]),
        );

        let sheets = workbook_sheets(&document);
        assert_eq!(sheets[1].rows[1][0], CellValue::Number(2));
        assert_eq!(sheets[1].rows[1][1], CellValue::text("Invalid login"));
        assert_eq!(
            sheets[2].rows[0],
            ["TC001", "X", "Y", "A\nB", "Z", ""]
                .into_iter()
                .map(CellValue::text)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_other_kinds_get_sheet_per_section() {
        let sheets = workbook_sheets(&empty(DocumentKind::Minutes));
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Meeting Summary",
                "Attendees",
                "Action Items",
                "Discussion Points",
                "Next Steps"
            ]
        );
        assert_eq!(sheets[1].columns, vec!["No.", "Attendees"]);
    }

    #[test]
    fn test_sheet_xml_escapes_and_styles() {
        let mut sheet = Sheet::new("Test/Cases?", &["Name"]);
        sheet.rows.push(vec![CellValue::text("Tom & Jerry")]);
        assert_eq!(sheet.name, "TestCases");

        let xml = sheet_xml(&sheet);
        assert!(xml.contains(r#"<c r="A1" s="1" t="inlineStr"><is><t xml:space="preserve">Name</t></is></c>"#));
        assert!(xml.contains("Tom &amp; Jerry"));
        assert!(xml.contains(r#"<row r="2">"#));
    }

    #[test]
    fn test_render_writes_workbook_package() {
        let bytes = XlsxRenderer.render(&empty(DocumentKind::TestCases)).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();

        let mut workbook = String::new();
        archive
            .by_name("xl/workbook.xml")
            .unwrap()
            .read_to_string(&mut workbook)
            .unwrap();
        assert!(workbook.contains(r#"<sheet name="Test Cases" sheetId="3" r:id="rId3"/>"#));

        let mut cases = String::new();
        archive
            .by_name("xl/worksheets/sheet3.xml")
            .unwrap()
            .read_to_string(&mut cases)
            .unwrap();
        assert!(cases.contains(r#"<t xml:space="preserve">N/A</t>"#));
        assert!(archive.by_name("xl/styles.xml").is_ok());
    }
}
