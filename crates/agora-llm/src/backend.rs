//! The generation backend abstraction.
//!
//! The engine never handles backend errors beyond substituting a
//! placeholder body, but the error type still carries enough context
//! (status, response body) for the logs to be useful.

use async_trait::async_trait;

/// Result type alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur during a generation call.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP transport failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body, for diagnostics.
        body: String,
    },

    /// The response JSON did not have the expected shape.
    #[error("unexpected response shape: {0}")]
    Json(#[from] serde_json::Error),

    /// The response contained no usable text.
    #[error("response contained no text content")]
    EmptyCompletion,
}

impl BackendError {
    /// Error category string for log fields.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(_) => "network",
            Self::Api { .. } => "api",
            Self::Json(_) | Self::EmptyCompletion => "parse",
        }
    }
}

/// A capability that turns a prompt and token budget into generated text.
///
/// Implementors must be `Send + Sync`; the engine holds one behind a
/// trait object for the whole run.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Model identifier used for log fields.
    fn model(&self) -> &str;

    /// Generate text for a prompt, bounded by `max_tokens`.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> BackendResult<String>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_and_body() {
        let err = BackendError::Api {
            status: 429,
            body: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "API error (429): overloaded");
        assert_eq!(err.category(), "api");
    }

    #[test]
    fn empty_completion_category_is_parse() {
        assert_eq!(BackendError::EmptyCompletion.category(), "parse");
    }

    #[test]
    fn backend_trait_is_object_safe() {
        fn assert_object_safe(_: &dyn TextBackend) {}
        let _ = assert_object_safe;
    }
}
