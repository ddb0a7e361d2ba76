//! Generative-model provider abstraction.
//!
//! The gateway treats the remote model as an opaque capability: given a
//! prompt and at most one inline binary part, return generated text or fail.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("network error: {0}")]
    Network(String),

    /// Non-success response from the model API, with the decoded response
    /// body when it was JSON.
    #[error("model API error {status}: {body}")]
    Api { status: u16, body: serde_json::Value },

    #[error("malformed model response: {0}")]
    Malformed(String),

    #[error("model returned no content")]
    Empty,
}

impl ProviderError {
    /// Structured form of the error. API failures expose their raw JSON
    /// body; everything else degrades to the display message.
    pub fn error_value(&self) -> serde_json::Value {
        match self {
            ProviderError::Api { body, .. } => body.clone(),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

/// One binary attachment sent alongside a prompt.
#[derive(Debug, Clone)]
pub struct InlinePart {
    /// MIME type label sent to the model.
    pub mime_type: String,
    /// Base64-encoded payload.
    pub data: String,
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait GenerateProvider: Send + Sync {
    /// Generate text from a prompt and an optional inline attachment.
    async fn generate(
        &self,
        prompt: &str,
        attachment: Option<&InlinePart>,
    ) -> Result<String, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
