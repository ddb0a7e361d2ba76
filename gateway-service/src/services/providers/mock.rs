//! Mock provider for testing.

use super::{GenerateProvider, InlinePart, ProviderError};
use async_trait::async_trait;
use base64::Engine;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One call observed by the mock, for assertions on what the gateway sent.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub attachment: Option<InlinePart>,
}

/// Scriptable provider double. Scripted outcomes are consumed in order;
/// once the script is exhausted, calls get an echo response describing
/// the prompt and attachment.
#[derive(Default)]
pub struct MockProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that answers every call with the given text.
    pub fn replying(text: &str) -> Self {
        let mock = Self::new();
        mock.enqueue(Ok(text.to_string()));
        mock
    }

    /// Mock whose next call fails with the given error.
    pub fn failing(err: ProviderError) -> Self {
        let mock = Self::new();
        mock.enqueue(Err(err));
        mock
    }

    pub fn enqueue(&self, outcome: Result<String, ProviderError>) {
        self.script.lock().unwrap().push_back(outcome);
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerateProvider for MockProvider {
    async fn generate(
        &self,
        prompt: &str,
        attachment: Option<&InlinePart>,
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            attachment: attachment.cloned(),
        });

        if let Some(outcome) = self.script.lock().unwrap().pop_front() {
            return outcome;
        }

        Ok(match attachment {
            Some(part) => {
                let decoded_len = base64::engine::general_purpose::STANDARD
                    .decode(&part.data)
                    .map(|b| b.len())
                    .unwrap_or(0);
                format!(
                    "Mock response for: {} [{} bytes of {}]",
                    prompt, decoded_len, part.mime_type
                )
            }
            None => format!("Mock response for: {}", prompt),
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
