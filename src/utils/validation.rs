use crate::utils::error::{DocGenError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DocGenError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 上傳檔案只接受純文字與 Word 文件
pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => {}
            Some(extension) => {
                return Err(DocGenError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(DocGenError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 顏色格式為六位十六進位 (不含 #)，Word 的 w:color 需要這種格式
pub fn validate_hex_color(field_name: &str, value: &str) -> Result<()> {
    if value.len() != 6 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Color must be six hexadecimal digits, e.g. 333333".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("generator.endpoint", "https://example.com").is_ok());
        assert!(validate_url("generator.endpoint", "http://example.com").is_ok());
        assert!(validate_url("generator.endpoint", "").is_err());
        assert!(validate_url("generator.endpoint", "invalid-url").is_err());
        assert!(validate_url("generator.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("style.heading_color", "333333").is_ok());
        assert!(validate_hex_color("style.heading_color", "1f4E79").is_ok());
        assert!(validate_hex_color("style.heading_color", "#333333").is_err());
        assert!(validate_hex_color("style.heading_color", "33333").is_err());
        assert!(validate_hex_color("style.heading_color", "zzzzzz").is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["brd.docx".to_string(), "notes.TXT".to_string()];
        assert!(validate_file_extensions("inputs", &files, &["txt", "md", "docx"]).is_ok());

        let invalid_files = vec!["brd.pdf".to_string()];
        assert!(validate_file_extensions("inputs", &invalid_files, &["txt", "md", "docx"]).is_err());

        let no_extension = vec!["README".to_string()];
        assert!(validate_file_extensions("inputs", &no_extension, &["txt"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("generator.timeout_seconds", 30u64, 1, 600).is_ok());
        assert!(validate_range("generator.timeout_seconds", 0u64, 1, 600).is_err());
    }
}
