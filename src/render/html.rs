use super::{list_items, resolved_sections, text_or_fallback, RenderStyle, Renderer};
use crate::domain::model::{FieldValue, RenderableDocument, SectionLabel, TableField, TestCaseRecord};
use crate::utils::error::Result;
use std::fmt::Write;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// 跳脫後把換行轉成 <br>
fn multiline(text: &str) -> String {
    escape_html(text.trim()).replace('\n', "<br>")
}

/// 固定樣板的 HTML 片段；缺少的區段顯示預設文字
pub fn render_html(document: &RenderableDocument) -> String {
    let mut html = String::new();

    let _ = writeln!(
        html,
        "<div class=\"document-container\" data-kind=\"{}\">",
        document.kind
    );
    let _ = writeln!(html, "<h1>{}</h1>", escape_html(document.title()));

    let header = document.meta.header_lines();
    if !header.is_empty() {
        html.push_str("<div class=\"document-header\">\n");
        for (name, value) in header {
            let _ = writeln!(
                html,
                "<p><strong>{}:</strong> {}</p>",
                name,
                escape_html(value.trim())
            );
        }
        html.push_str("</div>\n");
    }

    for (index, (label, value)) in resolved_sections(document).iter().enumerate() {
        html.push_str("<div class=\"document-section\">\n");
        let _ = writeln!(
            html,
            "<h2>{}. {}</h2>",
            index + 1,
            escape_html(document.kind.section_title(*label))
        );
        write_value(&mut html, *label, value);
        html.push_str("</div>\n");
    }

    let _ = writeln!(
        html,
        "<div class=\"document-footer\"><p><strong>{}</strong></p></div>",
        document.kind.footer()
    );
    html.push_str("</div>\n");

    html
}

fn write_value(html: &mut String, label: SectionLabel, value: &FieldValue) {
    match value {
        FieldValue::Text(text) => {
            let _ = writeln!(html, "<p>{}</p>", multiline(text_or_fallback(label, text)));
        }
        FieldValue::List(items) => {
            html.push_str("<ul>\n");
            for item in list_items(label, items) {
                let _ = writeln!(html, "<li>{}</li>", multiline(item));
            }
            html.push_str("</ul>\n");
        }
        FieldValue::Table(table) => write_table(html, label, table),
        FieldValue::TestCases(records) => write_test_cases(html, label, records),
    }
}

fn write_table(html: &mut String, label: SectionLabel, table: &TableField) {
    html.push_str("<table>\n<thead><tr>");
    for header in &table.headers {
        let _ = write!(html, "<th>{}</th>", escape_html(header));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    if table.rows.is_empty() {
        let _ = writeln!(
            html,
            "<tr><td colspan=\"{}\">{}</td></tr>",
            table.headers.len().max(1),
            escape_html(label.fallback())
        );
    }
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", multiline(cell));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n");
}

fn write_test_cases(html: &mut String, label: SectionLabel, records: &[TestCaseRecord]) {
    if records.is_empty() {
        let _ = writeln!(html, "<p>{}</p>", escape_html(label.fallback()));
        return;
    }

    for record in records {
        html.push_str("<div class=\"test-case\">\n");
        for (name, value) in TestCaseRecord::COLUMNS.iter().zip(record.cells()) {
            // Note 欄位只在有內容時輸出
            if *name == "Note" && value.trim().is_empty() {
                continue;
            }
            let _ = writeln!(
                html,
                "<p><strong>{}:</strong> {}</p>",
                name,
                multiline(value)
            );
        }
        html.push_str("</div>\n");
    }
}

/// Word 以 HTML 開啟的 .doc 外殼
pub fn render_word_html(document: &RenderableDocument, style: &RenderStyle) -> String {
    format!(
        "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" xmlns:w=\"urn:schemas-microsoft-com:office:word\" xmlns=\"http://www.w3.org/TR/REC-html40\">\n\
         <head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <!--[if gte mso 9]><xml><w:WordDocument><w:View>Print</w:View><w:Zoom>100</w:Zoom><w:DoNotOptimizeForBrowser/></w:WordDocument></xml><![endif]-->\n\
         <style>\n\
         body {{ font-family: '{font}', sans-serif; font-size: 11pt; color: #{body}; }}\n\
         h1 {{ color: #{heading}; font-size: 20pt; text-align: center; }}\n\
         h2 {{ color: #{heading}; font-size: 14pt; margin-top: 18pt; }}\n\
         strong {{ color: #{heading}; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         th, td {{ border: 1px solid #bfbfbf; padding: 4pt 6pt; vertical-align: top; }}\n\
         th {{ background: #f2f2f2; color: #{heading}; }}\n\
         .test-case {{ margin-bottom: 12pt; }}\n\
         .document-footer {{ text-align: center; margin-top: 24pt; }}\n\
         </style>\n</head>\n<body>\n{fragment}</body>\n</html>\n",
        title = escape_html(document.title()),
        font = escape_html(&style.font),
        body = style.body_color,
        heading = style.heading_color,
        fragment = render_html(document),
    )
}

pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, document: &RenderableDocument) -> Result<Vec<u8>> {
        Ok(render_html(document).into_bytes())
    }
}

pub struct WordHtmlRenderer {
    style: RenderStyle,
}

impl WordHtmlRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }
}

impl Renderer for WordHtmlRenderer {
    fn render(&self, document: &RenderableDocument) -> Result<Vec<u8>> {
        Ok(render_word_html(document, &self.style).into_bytes())
    }
}
