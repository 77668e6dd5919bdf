use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// XML 跳脫，並移除 XML 1.0 不允許的控制字元
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

pub fn core_properties(title: &str) -> String {
    format!(
        r#"{}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>ba-docgen</dc:creator></cp:coreProperties>"#,
        XML_DECLARATION,
        escape_xml(title)
    )
}

/// 把 (路徑, 內容) 依序寫成 OOXML 套件 (zip)
pub fn write_package(entries: &[(String, String)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, content) in entries {
        zip.start_file(path.as_str(), options)?;
        zip.write_all(content.as_bytes())?;
    }

    let cursor = zip.finish()?;
    let bytes = cursor.into_inner();
    tracing::debug!("Packaged {} parts ({} bytes)", entries.len(), bytes.len());
    Ok(bytes)
}
