use crate::utils::error::{DocGenError, Result};
use regex::Regex;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:p[ >].*?</w:p>").expect("valid paragraph pattern"));

static RUN_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:br\s*/>|<w:tab\s*/>")
        .expect("valid run content pattern")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#x([0-9a-fA-F]+)|#([0-9]+)|(lt|gt|quot|apos|amp));")
        .expect("valid entity pattern")
});

/// 具名實體與數字字元參照 (&#160; &#x2019;)；無效的參照原樣保留
fn unescape_xml(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let code = match (caps.get(1), caps.get(2)) {
                (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (_, Some(decimal)) => decimal.as_str().parse::<u32>().ok(),
                _ => None,
            };
            match (code, caps.get(3).map(|m| m.as_str())) {
                (Some(code), _) => char::from_u32(code)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string()),
                (None, Some("lt")) => "<".to_string(),
                (None, Some("gt")) => ">".to_string(),
                (None, Some("quot")) => "\"".to_string(),
                (None, Some("apos")) => "'".to_string(),
                (None, Some("amp")) => "&".to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// 取出 .docx 內文，每個段落一行
pub fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(|e| {
        DocGenError::InputError {
            message: format!("Not a valid Word document: {}", e),
        }
    })?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| DocGenError::InputError {
            message: "Word document has no word/document.xml part".to_string(),
        })?
        .read_to_string(&mut xml)?;

    let paragraphs: Vec<String> = PARAGRAPH
        .find_iter(&xml)
        .map(|paragraph| {
            RUN_CONTENT
                .captures_iter(paragraph.as_str())
                .map(|caps| match caps.get(1) {
                    Some(text) => unescape_xml(text.as_str()),
                    None if caps[0].starts_with("<w:tab") => "\t".to_string(),
                    None => "\n".to_string(),
                })
                .collect()
        })
        .collect();

    tracing::debug!("Extracted {} paragraphs from Word document", paragraphs.len());

    Ok(paragraphs.join("\n").trim().to_string())
}

/// 上傳的輸入檔：.docx 取內文，其他視為 UTF-8 純文字
pub fn input_text(file_name: &str, bytes: &[u8]) -> Result<String> {
    let is_docx = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));

    if is_docx {
        return extract_docx_text(bytes);
    }

    String::from_utf8(bytes.to_vec()).map_err(|e| DocGenError::InputError {
        message: format!("{} is not valid UTF-8 text: {}", file_name, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DocumentKind, DocumentMeta, FieldValue, RenderableDocument, SectionLabel};
    use crate::render::docx::DocxRenderer;
    use crate::render::xml::write_package;
    use crate::render::{RenderStyle, Renderer};

    #[test]
    fn test_extract_paragraphs_and_entities() {
        let xml = r#"<?xml version="1.0"?><w:document xmlns:w="x"><w:body><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>Net Banking </w:t></w:r><w:r><w:t xml:space="preserve">BRD &amp; Scope</w:t></w:r></w:p><w:p><w:r><w:t>Line one</w:t><w:br/><w:t>Line two</w:t></w:r></w:p></w:body></w:document>"#;
        let bytes = write_package(&[("word/document.xml".to_string(), xml.to_string())]).unwrap();

        assert_eq!(
            extract_docx_text(&bytes).unwrap(),
            "Net Banking BRD & Scope\nLine one\nLine two"
        );
    }

    #[test]
    fn test_numeric_character_references() {
        assert_eq!(
            unescape_xml("Alice&#x2019;s&#160;plan &amp;#38; &#38; &lt;v2&gt; &#xFFFFFFFF;"),
            "Alice\u{2019}s\u{a0}plan &#38; & <v2> &#xFFFFFFFF;"
        );
    }

    #[test]
    fn test_rendered_docx_round_trips_section_titles() {
        let mut document = RenderableDocument::new(
            DocumentKind::Minutes,
            DocumentMeta::for_kind(DocumentKind::Minutes),
        );
        document.insert(
            SectionLabel::Attendees,
            FieldValue::List(vec!["Alice".to_string()]),
        );
        let bytes = DocxRenderer::new(RenderStyle::default())
            .render(&document)
            .unwrap();

        let text = extract_docx_text(&bytes).unwrap();
        assert!(text.starts_with("Minutes of Meeting"));
        for title in [
            "Meeting Summary",
            "Attendees",
            "Action Items",
            "Discussion Points",
            "Next Steps",
        ] {
            assert!(text.contains(title), "missing {}", title);
        }
        assert!(text.contains("• Alice"));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            extract_docx_text(b"plain text"),
            Err(DocGenError::InputError { .. })
        ));

        let bytes = write_package(&[("other.xml".to_string(), "<a/>".to_string())]).unwrap();
        assert!(matches!(
            extract_docx_text(&bytes),
            Err(DocGenError::InputError { .. })
        ));
    }

    #[test]
    fn test_input_text_by_extension() {
        assert_eq!(input_text("notes.txt", b"hello").unwrap(), "hello");
        assert!(input_text("notes.txt", &[0xff, 0xfe]).is_err());
        assert!(input_text("brief.DOCX", b"not a zip").is_err());
    }
}
