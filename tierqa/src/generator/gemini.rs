//! Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

use super::{build_prompt, AnswerGenerator, GeneratorError};

/// Gemini v1beta REST API base
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Clone)]
pub struct GeminiConfig {
    /// Sent as the `?key=` query parameter. Without one every call fails.
    pub api_key: Option<String>,
    pub model: String,
    /// Overridable so tests can point at a local server
    pub api_base: String,
    /// Transport-level timeout for one request
    pub request_timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_base: GEMINI_API_BASE.to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

pub struct GeminiGenerator {
    config: GeminiConfig,
    client: Client,
}

impl fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("config", &self.config)
            .finish()
    }
}

impl GeminiGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self, GeneratorError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GeneratorError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn api_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body(question: &str) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(question) }]
            }]
        })
    }

    /// Concatenated text of the first candidate, skipping `thought` parts
    ///
    /// Falls back to the thought text when that is all the reply holds.
    pub fn extract_text(response: &Value) -> Option<String> {
        let parts = response["candidates"][0]["content"]["parts"].as_array()?;

        let final_parts: Vec<&str> = parts
            .iter()
            .filter(|p| !p["thought"].as_bool().unwrap_or(false))
            .filter_map(|p| p["text"].as_str())
            .collect();
        if !final_parts.is_empty() {
            return Some(final_parts.concat());
        }

        let thought_parts: Vec<&str> = parts.iter().filter_map(|p| p["text"].as_str()).collect();
        if thought_parts.is_empty() {
            None
        } else {
            Some(thought_parts.concat())
        }
    }
}

/// Map a non-success HTTP status to a generator failure
pub fn classify_status(status: StatusCode, message: String) -> GeneratorError {
    match status.as_u16() {
        429 => GeneratorError::RateLimited(message),
        500 | 502 | 503 | 504 => GeneratorError::TransientUnavailable(message),
        _ => GeneratorError::Other(message),
    }
}

fn classify_transport(err: reqwest::Error) -> GeneratorError {
    if err.is_timeout() || err.is_connect() {
        GeneratorError::Connectivity(format!("Gemini request failed: {}", err.without_url()))
    } else {
        GeneratorError::Other(format!("Gemini request failed: {}", err.without_url()))
    }
}

#[async_trait]
impl AnswerGenerator for GeminiGenerator {
    async fn generate(&self, question: &str) -> Result<String, GeneratorError> {
        let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Err(GeneratorError::Other(
                "Gemini API key is not configured".to_string(),
            ));
        };

        debug!("Gemini request to model {}", self.config.model);

        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", api_key)])
            .json(&Self::request_body(question))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if status.is_success() {
            let body: Value = response.json().await.map_err(classify_transport)?;
            return Self::extract_text(&body).ok_or_else(|| {
                GeneratorError::Other("Gemini response contained no text".to_string())
            });
        }

        let error_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&error_text)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(error_text);

        error!("Gemini API returned {}: {}", status, message);
        Err(classify_status(
            status,
            format!("Gemini API error ({}): {}", status.as_u16(), message),
        ))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
