//! WordprocessingML (.docx) writer.
//!
//! Only the parts Word needs to open the file are written: content types,
//! package relationships, core properties and `word/document.xml`.

use super::xml::{core_properties, escape_xml, write_package, XML_DECLARATION};
use super::{list_items, resolved_sections, text_or_fallback, RenderStyle, Renderer};
use crate::domain::model::{FieldValue, RenderableDocument, SectionLabel, TableField, TestCaseRecord};
use crate::utils::error::Result;

const CONTENT_TYPES: &str = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const SECTION_PROPERTIES: &str = r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#;

// 字級以半點為單位
const TITLE_SIZE: u32 = 40;
const HEADING_SIZE: u32 = 28;
const BODY_SIZE: u32 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

struct Run<'a> {
    text: &'a str,
    bold: bool,
    color: &'a str,
    size: u32,
}

pub struct DocxRenderer {
    style: RenderStyle,
}

impl DocxRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    fn run(&self, run: &Run<'_>) -> String {
        let font = escape_xml(&self.style.font);
        let mut xml = format!(
            r#"<w:r><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#
        );
        if run.bold {
            xml.push_str("<w:b/>");
        }
        xml.push_str(&format!(
            r#"<w:color w:val="{}"/><w:sz w:val="{}"/><w:szCs w:val="{}"/></w:rPr>"#,
            run.color, run.size, run.size
        ));

        // 多行文字以 <w:br/> 分隔
        for (index, line) in run.text.split('\n').enumerate() {
            if index > 0 {
                xml.push_str("<w:br/>");
            }
            xml.push_str(&format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape_xml(line)
            ));
        }
        xml.push_str("</w:r>");
        xml
    }

    fn paragraph(&self, runs: &[Run<'_>], align: Align, indent: bool) -> String {
        let mut xml = String::from(r#"<w:p><w:pPr><w:spacing w:after="120"/>"#);
        if indent {
            xml.push_str(r#"<w:ind w:left="360"/>"#);
        }
        if align == Align::Center {
            xml.push_str(r#"<w:jc w:val="center"/>"#);
        }
        xml.push_str("</w:pPr>");
        for run in runs {
            xml.push_str(&self.run(run));
        }
        xml.push_str("</w:p>");
        xml
    }

    fn heading(&self, text: &str, size: u32, align: Align) -> String {
        self.paragraph(
            &[Run {
                text,
                bold: true,
                color: &self.style.heading_color,
                size,
            }],
            align,
            false,
        )
    }

    fn body(&self, text: &str, indent: bool) -> String {
        self.paragraph(
            &[Run {
                text,
                bold: false,
                color: &self.style.body_color,
                size: BODY_SIZE,
            }],
            Align::Left,
            indent,
        )
    }

    /// 「標籤: 值」一行，標籤使用標題色
    fn labeled(&self, name: &str, value: &str) -> String {
        self.paragraph(
            &[
                Run {
                    text: &format!("{}: ", name),
                    bold: true,
                    color: &self.style.heading_color,
                    size: BODY_SIZE,
                },
                Run {
                    text: value,
                    bold: false,
                    color: &self.style.body_color,
                    size: BODY_SIZE,
                },
            ],
            Align::Left,
            false,
        )
    }

    fn table(&self, label: SectionLabel, table: &TableField) -> String {
        let columns = table.headers.len().max(1);
        let border = r#"w:val="single" w:sz="4" w:space="0" w:color="BFBFBF""#;
        let mut xml = format!(
            r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblBorders><w:top {b}/><w:left {b}/><w:bottom {b}/><w:right {b}/><w:insideH {b}/><w:insideV {b}/></w:tblBorders></w:tblPr><w:tblGrid>"#,
            b = border
        );
        for _ in 0..columns {
            xml.push_str("<w:gridCol/>");
        }
        xml.push_str("</w:tblGrid>");

        xml.push_str("<w:tr>");
        for header in &table.headers {
            xml.push_str(&self.cell(header, true));
        }
        xml.push_str("</w:tr>");

        if table.rows.is_empty() {
            xml.push_str("<w:tr>");
            xml.push_str(&self.cell(label.fallback(), false));
            for _ in 1..columns {
                xml.push_str(&self.cell("", false));
            }
            xml.push_str("</w:tr>");
        }
        for row in &table.rows {
            xml.push_str("<w:tr>");
            for cell in row {
                xml.push_str(&self.cell(cell, false));
            }
            xml.push_str("</w:tr>");
        }

        xml.push_str("</w:tbl>");
        xml
    }

    fn cell(&self, text: &str, header: bool) -> String {
        let shading = if header {
            r#"<w:shd w:val="clear" w:color="auto" w:fill="F2F2F2"/>"#
        } else {
            ""
        };
        let color = if header {
            &self.style.heading_color
        } else {
            &self.style.body_color
        };
        format!(
            r#"<w:tc><w:tcPr><w:tcW w:w="0" w:type="auto"/>{}</w:tcPr>{}</w:tc>"#,
            shading,
            self.paragraph(
                &[Run {
                    text,
                    bold: header,
                    color,
                    size: BODY_SIZE,
                }],
                Align::Left,
                false,
            )
        )
    }

    fn test_cases(&self, label: SectionLabel, records: &[TestCaseRecord]) -> String {
        if records.is_empty() {
            return self.body(label.fallback(), false);
        }

        let mut xml = String::new();
        for record in records {
            for (name, value) in TestCaseRecord::COLUMNS.iter().zip(record.cells()) {
                if *name == "Note" && value.trim().is_empty() {
                    continue;
                }
                xml.push_str(&self.labeled(name, value));
            }
            // 案例之間留一空行
            xml.push_str(&self.body("", false));
        }
        xml
    }

    fn value(&self, label: SectionLabel, value: &FieldValue) -> String {
        match value {
            FieldValue::Text(text) => self.body(text_or_fallback(label, text).trim(), false),
            FieldValue::List(items) => list_items(label, items)
                .into_iter()
                .map(|item| self.body(&format!("• {}", item.trim()), true))
                .collect(),
            FieldValue::Table(table) => self.table(label, table),
            FieldValue::TestCases(records) => self.test_cases(label, records),
        }
    }

    pub fn document_xml(&self, document: &RenderableDocument) -> String {
        let mut body = self.heading(document.title(), TITLE_SIZE, Align::Center);

        for (name, value) in document.meta.header_lines() {
            body.push_str(&self.labeled(name, value.trim()));
        }

        for (index, (label, value)) in resolved_sections(document).iter().enumerate() {
            let title = format!("{}. {}", index + 1, document.kind.section_title(*label));
            body.push_str(&self.heading(&title, HEADING_SIZE, Align::Left));
            body.push_str(&self.value(*label, value));
        }

        body.push_str(&self.heading(document.kind.footer(), BODY_SIZE, Align::Center));

        format!(
            r#"{}<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}{}</w:body></w:document>"#,
            XML_DECLARATION, body, SECTION_PROPERTIES
        )
    }
}

impl Renderer for DocxRenderer {
    fn render(&self, document: &RenderableDocument) -> Result<Vec<u8>> {
        let entries = vec![
            (
                "[Content_Types].xml".to_string(),
                format!("{}{}", XML_DECLARATION, CONTENT_TYPES),
            ),
            (
                "_rels/.rels".to_string(),
                format!("{}{}", XML_DECLARATION, PACKAGE_RELS),
            ),
            (
                "docProps/core.xml".to_string(),
                core_properties(document.title()),
            ),
            ("word/document.xml".to_string(), self.document_xml(document)),
        ];

        write_package(&entries)
    }
}
