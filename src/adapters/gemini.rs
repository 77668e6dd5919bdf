use crate::config::toml_config::GeneratorConfig;
use crate::domain::ports::TextGenerator;
use crate::utils::error::{DocGenError, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Gemini `generateContent` 用戶端
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Option<Duration>,
}

impl GeminiClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let client = Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            config.resolve_api_key()?,
        );

        Ok(match config.timeout_seconds {
            Some(seconds) => client.with_timeout(Duration::from_secs(seconds)),
            None => client,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    pub fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        })
    }

    /// 回傳服務原始 JSON，不做任何加工
    pub async fn generate_raw(&self, prompt: &str) -> Result<Value> {
        tracing::debug!("📡 POST {} (model {})", self.url(), self.model);

        let mut request = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(prompt));

        // 設定超時
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        // 錯誤訊息不可帶出含 key 的 URL
        let response = request.send().await.map_err(|e| e.without_url())?;
        let status = response.status();
        tracing::debug!("📡 Generator response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("❌ Generator request failed with status {}: {}", status, body);
            return Err(DocGenError::GeneratorError {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        Ok(response.json().await.map_err(|e| e.without_url())?)
    }
}

/// 取出第一個候選回應的所有文字片段
pub fn candidate_text(response: &Value) -> Option<String> {
    let parts = response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    Some(text)
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self.generate_raw(prompt).await?;

        match candidate_text(&response) {
            Some(text) => Ok(text),
            None => {
                // 例如被安全機制擋下時沒有 candidates
                tracing::warn!("⚠️ Generator response contained no candidate text");
                Err(DocGenError::GeneratorError {
                    status: 200,
                    message: "Response contained no candidate text".to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn gemini_response(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[test]
    fn test_request_body_shape() {
        assert_eq!(
            GeminiClient::request_body("hi"),
            json!({"contents": [{"role": "user", "parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn test_candidate_text_joins_parts() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Attendees:\n" }, { "text": "* Alice" }] } }]
        });
        assert_eq!(
            candidate_text(&response).as_deref(),
            Some("Attendees:\n* Alice")
        );
        assert_eq!(candidate_text(&json!({"promptFeedback": {}})), None);
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.0-flash:generateContent")
                .query_param("key", "test-key")
                .json_body(GeminiClient::request_body("Summarize"));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(gemini_response("Meeting Summary:\nShort."));
        });

        let client = GeminiClient::new(server.base_url(), "gemini-2.0-flash", "test-key");
        let text = client.generate("Summarize").await.unwrap();

        api_mock.assert();
        assert_eq!(text, "Meeting Summary:\nShort.");
    }

    #[tokio::test]
    async fn test_non_success_status_is_generator_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST);
            then.status(403)
                .header("Content-Type", "application/json")
                .json_body(json!({"error": {"code": 403, "message": "API key not valid"}}));
        });

        let client = GeminiClient::new(server.base_url(), "gemini-2.0-flash", "bad-key");
        let result = client.generate_raw("hello").await;

        api_mock.assert();
        match result {
            Err(DocGenError::GeneratorError { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_candidates_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        });

        let client = GeminiClient::new(server.base_url(), "gemini-2.0-flash", "key");
        assert!(client.generate("hello").await.is_err());
    }
}
