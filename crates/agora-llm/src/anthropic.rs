//! Anthropic Messages API backend.
//!
//! Single-turn, non-streaming requests: the whole prompt goes in one
//! user message and the first text content block comes back as the
//! generated body. The credential is resolved at construction so a
//! missing key aborts the run before any document is touched.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use agora_core::ConfigurationError;

use crate::backend::{BackendError, BackendResult, TextBackend};

/// Default base URL for the Anthropic API.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value.
const API_VERSION: &str = "2023-06-01";

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

/// Configuration for the Anthropic backend.
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    /// API key.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Base URL override, used by tests.
    pub base_url: Option<String>,
}

impl AnthropicConfig {
    /// Config with the given key and the default model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: None,
        }
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [MessageParam<'a>; 1],
}

#[derive(Serialize)]
struct MessageParam<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic text generation backend.
#[derive(Debug)]
pub struct AnthropicBackend {
    config: AnthropicConfig,
    client: reqwest::Client,
}

impl AnthropicBackend {
    /// Create a backend from an explicit configuration.
    #[must_use]
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Create a backend with the credential from [`API_KEY_VAR`].
    ///
    /// Fails with [`ConfigurationError::MissingCredential`] when the
    /// variable is unset or empty.
    pub fn from_env(model: impl Into<String>) -> Result<Self, ConfigurationError> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigurationError::MissingCredential(API_KEY_VAR))?;
        Ok(Self::new(AnthropicConfig::new(api_key).with_model(model)))
    }

    fn headers(&self) -> BackendResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let _ = headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        let key = HeaderValue::from_str(&self.config.api_key).map_err(|_| BackendError::Api {
            status: 0,
            body: "API key contains non-header characters".to_owned(),
        })?;
        let _ = headers.insert("x-api-key", key);
        Ok(headers)
    }
}

#[async_trait]
impl TextBackend for AnthropicBackend {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> BackendResult<String> {
        let base_url = self.config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let url = format!("{base_url}/v1/messages");

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens,
            messages: [MessageParam {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.config.model, max_tokens, "sending generation request");

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        let text = parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .ok_or(BackendError::EmptyCompletion)?;

        debug!(chars = text.len(), "generation response received");
        Ok(text)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
