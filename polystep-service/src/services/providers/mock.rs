//! Mock provider implementation for testing.

use super::{GenerationRequest, GenerativeProvider, ProviderError, ProviderResponse};
use async_trait::async_trait;
use std::sync::Mutex;

/// Provider that answers every call with a canned result and remembers the
/// requests it was given.
pub struct MockProvider {
    result: Result<ProviderResponse, ProviderError>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockProvider {
    pub fn new(response: ProviderResponse) -> Self {
        Self {
            result: Ok(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(ProviderResponse {
            text: Some(text.into()),
            ..ProviderResponse::default()
        })
    }

    /// Fail every call with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            result: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerativeProvider for MockProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        self.result.clone()
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.result {
            Err(ProviderError::NotConfigured(msg)) => {
                Err(ProviderError::NotConfigured(msg.clone()))
            }
            _ => Ok(()),
        }
    }
}
