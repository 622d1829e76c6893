//! Google Gemini generateContent client.
//!
//! - Request body uses `contents[].parts[].text`; tuning goes in `generationConfig`.
//! - The API key travels in the `x-goog-api-key` header, never in the URL.
//! - Response text lives in `candidates[0].content.parts[*].text`.
//! - Errors come back as `{ "error": { "code", "message", "status" } }`.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use super::TextGenerator;
use crate::config::{ApiKey, Settings, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error_class::ErrorClass;
use crate::{Error, ErrorContext, Result};

pub const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    endpoint: Url,
    model: String,
    api_key: ApiKey,
    temperature: Option<f64>,
    max_output_tokens: Option<u32>,
}

impl GeminiClient {
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut builder = Self::builder()
            .api_key(settings.api_key.clone())
            .model(settings.model.clone())
            .base_url(settings.base_url.clone());
        if let Some(t) = settings.temperature {
            builder = builder.temperature(t);
        }
        if let Some(mt) = settings.max_output_tokens {
            builder = builder.max_output_tokens(mt);
        }
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Request body for a single-turn prompt.
    pub fn build_body(&self, prompt: &str) -> Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
        });

        let mut gen_config = json!({});
        if let Some(t) = self.temperature {
            gen_config["temperature"] = json!(t);
        }
        if let Some(mt) = self.max_output_tokens {
            gen_config["maxOutputTokens"] = json!(mt);
        }
        if gen_config != json!({}) {
            body["generationConfig"] = gen_config;
        }
        body
    }
}

/// Pull the text out of a successful response body.
pub fn parse_response(body: &Value) -> Result<String> {
    let text: String = body
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if !text.is_empty() {
        return Ok(text);
    }

    // No text: either the prompt was blocked or the candidate finished without output.
    let block_reason = body
        .pointer("/promptFeedback/blockReason")
        .and_then(|v| v.as_str());
    let finish_reason = body
        .pointer("/candidates/0/finishReason")
        .and_then(|v| v.as_str());
    let (class, reason) = match (block_reason, finish_reason) {
        (Some(r), _) => (ErrorClass::ContentFilter, r),
        (None, Some(r)) => (ErrorClass::from_finish_reason(r), r),
        (None, None) => (ErrorClass::Other, "unknown"),
    };
    Err(Error::remote(
        200,
        class,
        format!("response contained no text (reason: {})", reason),
    ))
}

/// Extract a readable message from an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            let message = v.pointer("/error/message")?.as_str()?.to_string();
            match v.pointer("/error/status").and_then(|s| s.as_str()) {
                Some(status) => Some(format!("{}: {}", status, message)),
                None => Some(message),
            }
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = self.build_body(prompt);
        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "sending generateContent request"
        );

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = error_message(&text);
            let class = ErrorClass::from_status(status.as_u16(), &message);
            return Err(Error::remote(status.as_u16(), class, message));
        }

        let json: Value = serde_json::from_str(&text)?;
        let output = parse_response(&json)?;
        tracing::debug!(output_len = output.len(), "generateContent succeeded");
        Ok(output)
    }
}

pub struct GeminiClientBuilder {
    model: Option<String>,
    api_key: Option<ApiKey>,
    base_url: Option<String>,
    temperature: Option<f64>,
    max_output_tokens: Option<u32>,
    timeout: Option<Duration>,
}

impl GeminiClientBuilder {
    pub fn new() -> Self {
        Self {
            model: None,
            api_key: None,
            base_url: None,
            temperature: None,
            max_output_tokens: None,
            timeout: None,
        }
    }
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
    pub fn api_key(mut self, api_key: ApiKey) -> Self {
        self.api_key = Some(api_key);
        self
    }
    /// Override the API host. Primarily for pointing tests at a mock server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<GeminiClient> {
        let api_key = self.api_key.ok_or_else(|| {
            Error::configuration_with_context(
                "API key required",
                ErrorContext::new()
                    .with_field_path("gemini_api_key")
                    .with_source("gemini"),
            )
        })?;
        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        // Trailing slash so `join` appends rather than replacing the last segment.
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL: {}", e),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(base_url.clone()),
            )
        })?;
        let endpoint = base
            .join(&format!("v1beta/models/{}:generateContent", model))
            .map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid model name: {}", e),
                    ErrorContext::new()
                        .with_field_path("model")
                        .with_details(model.clone()),
                )
            })?;

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http_client = http
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(GeminiClient {
            http_client,
            endpoint,
            model,
            api_key,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        })
    }
}

impl Default for GeminiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::builder()
            .api_key(ApiKey::new("test-key"))
            .build()
            .unwrap()
    }

    #[test]
    fn endpoint_includes_model_and_method() {
        let c = client();
        assert_eq!(
            c.endpoint().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        let proxied = GeminiClient::builder()
            .api_key(ApiKey::new("k"))
            .base_url("http://proxy.local/gemini/")
            .model("gemini-1.5-pro")
            .build()
            .unwrap();
        assert_eq!(
            proxied.endpoint().as_str(),
            "http://proxy.local/gemini/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn missing_key_fails_build() {
        let err = GeminiClient::builder().build().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn body_omits_generation_config_by_default() {
        let body = client().build_body("hello");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn body_carries_generation_config() {
        let c = GeminiClient::builder()
            .api_key(ApiKey::new("k"))
            .temperature(0.5)
            .max_output_tokens(2048)
            .build()
            .unwrap();
        let body = c.build_body("hi");
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn parse_concatenates_text_parts() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello, " }, { "text": "octocat" }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(parse_response(&body).unwrap(), "Hello, octocat");
    }

    #[test]
    fn parse_reports_safety_block() {
        let body = json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        let err = parse_response(&body).unwrap_err();
        assert_eq!(err.class(), Some(ErrorClass::ContentFilter));

        let blocked = json!({ "promptFeedback": { "blockReason": "OTHER" } });
        let err = parse_response(&blocked).unwrap_err();
        assert_eq!(err.class(), Some(ErrorClass::ContentFilter));
        assert!(err.to_string().contains("OTHER"));
    }

    #[test]
    fn error_message_prefers_structured_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "INVALID_ARGUMENT: API key not valid");
        assert_eq!(error_message("upstream exploded"), "upstream exploded");
    }
}
