use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocGenError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Input error: {message}")]
    InputError { message: String },

    #[error("Failed to render {format} document: {message}")]
    RenderError { format: String, message: String },

    #[error("Text generator responded with status {status}: {message}")]
    GeneratorError { status: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Rendering,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DocGenError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DocGenError::ConfigError { .. }
            | DocGenError::ConfigValidationError { .. }
            | DocGenError::InvalidConfigValueError { .. }
            | DocGenError::MissingConfigError { .. } => ErrorCategory::Configuration,
            DocGenError::InputError { .. } | DocGenError::SerializationError(_) => {
                ErrorCategory::Input
            }
            DocGenError::HttpError(_) | DocGenError::GeneratorError { .. } => {
                ErrorCategory::Network
            }
            DocGenError::ZipError(_) | DocGenError::CsvError(_) | DocGenError::RenderError { .. } => {
                ErrorCategory::Rendering
            }
            DocGenError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常重試即可
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Rendering => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            DocGenError::ConfigError { message } => format!("Configuration problem: {}", message),
            DocGenError::ConfigValidationError { field, message } => {
                format!("Configuration field '{}' is invalid: {}", field, message)
            }
            DocGenError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            DocGenError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            DocGenError::InputError { message } => message.clone(),
            DocGenError::RenderError { format, .. } => {
                format!("Unable to produce the {} document", format)
            }
            DocGenError::HttpError(_) => {
                "Unable to reach the text generation service".to_string()
            }
            DocGenError::GeneratorError { status, .. } => {
                format!("The text generation service failed (HTTP {})", status)
            }
            DocGenError::ZipError(_) | DocGenError::CsvError(_) => {
                "Unable to encode the output document".to_string()
            }
            DocGenError::IoError(e) => format!("File system error: {}", e),
            DocGenError::SerializationError(_) => {
                "Received malformed JSON data".to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the TOML configuration file and command line flags",
            ErrorCategory::Input => "Check that the input files exist and contain text",
            ErrorCategory::Network => "Check the API key and network connection, then retry",
            ErrorCategory::Rendering => "Retry with another output format or check the output directory",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, DocGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_error_is_retryable() {
        let err = DocGenError::GeneratorError {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().contains("503"));
    }

    #[test]
    fn test_render_error_message() {
        let err = DocGenError::RenderError {
            format: "xlsx".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Rendering);
        assert_eq!(err.to_string(), "Failed to render xlsx document: boom");
    }
}
