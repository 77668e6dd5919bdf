use crate::domain::model::{MergePolicy, OutputFormat};
use crate::render::RenderStyle;
use crate::utils::error::{DocGenError, Result};
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::LazyLock;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env placeholder pattern"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generator: GeneratorConfig,
    pub output: OutputConfig,
    pub style: RenderStyle,
    pub parsing: ParsingConfig,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            timeout_seconds: Some(120),
        }
    }
}

impl GeneratorConfig {
    /// 設定檔優先，其次是 GEMINI_API_KEY 環境變數；未替換的 ${...} 視為未設定
    pub fn resolve_api_key(&self) -> Result<String> {
        let configured = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !ENV_PLACEHOLDER.is_match(key))
            .map(str::to_string);

        configured
            .or_else(|| {
                std::env::var(API_KEY_ENV)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
            .ok_or_else(|| DocGenError::MissingConfigError {
                field: "generator.api_key".to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
            formats: vec!["docx".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    pub merge_policy: MergePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub bind_address: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DocGenError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DocGenError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})，找不到的變數保留原字串
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn output_formats(&self) -> Result<Vec<OutputFormat>> {
        self.output
            .formats
            .iter()
            .map(|format| {
                format
                    .parse::<OutputFormat>()
                    .map_err(|reason| DocGenError::InvalidConfigValueError {
                        field: "output.formats".to_string(),
                        value: format.clone(),
                        reason,
                    })
            })
            .collect()
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.proxy
            .bind_address
            .parse()
            .map_err(|e: std::net::AddrParseError| DocGenError::InvalidConfigValueError {
                field: "proxy.bind_address".to_string(),
                value: self.proxy.bind_address.clone(),
                reason: e.to_string(),
            })
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_url("generator.endpoint", &self.generator.endpoint)?;
        crate::utils::validation::validate_non_empty_string(
            "generator.model",
            &self.generator.model,
        )?;
        if let Some(timeout) = self.generator.timeout_seconds {
            validate_range("generator.timeout_seconds", timeout, 1, 600)?;
        }

        validate_path("output.path", &self.output.path)?;
        if self.output_formats()?.is_empty() {
            return Err(DocGenError::ConfigValidationError {
                field: "output.formats".to_string(),
                message: "At least one output format is required".to_string(),
            });
        }

        self.style.validate()?;
        self.bind_address()?;

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
