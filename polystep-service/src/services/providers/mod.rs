//! AI provider abstractions and implementations.
//!
//! The gateway talks to a [`GenerativeProvider`] so the Gemini backend can be
//! swapped for the mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Display is the bare message; clients see it verbatim.
    #[error("{0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty response from provider")]
    EmptyResponse,

    #[error("No image generated")]
    NoImage,

    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::InvalidResponse(_) => "invalid_response",
            ProviderError::EmptyResponse => "empty_response",
            ProviderError::NoImage => "no_image",
            ProviderError::InvalidModel(_) => "invalid_model",
        }
    }
}

/// Model ids are a single URL path segment: letters, digits, `.`, `_` and
/// `-`, optionally behind a `models/` prefix.
pub fn is_valid_model_id(model: &str) -> bool {
    let id = model.strip_prefix("models/").unwrap_or(model);
    !id.is_empty()
        && !id.chars().all(|c| c == '.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// What the caller wants back besides plain text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationParams {
    /// JSON schema for structured output; implies a JSON response.
    pub response_schema: Option<serde_json::Value>,

    /// Ground the answer with web search.
    pub google_search: bool,

    /// Request an image at this aspect ratio (e.g. "16:9").
    pub image_aspect_ratio: Option<String>,
}

/// A single provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub params: GenerationParams,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// Base64 media returned inline by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64-encoded bytes, as sent by the provider.
    pub data: String,
}

/// A web citation backing a grounded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinishReason {
    #[default]
    Complete,
    Length,
    ContentFilter,
}

/// Normalized result of a provider call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResponse {
    /// Concatenated text parts of the first candidate.
    pub text: Option<String>,

    /// Inline images of the first candidate, in response order.
    pub images: Vec<InlineImage>,

    /// Grounding citations; empty when the answer was not grounded.
    pub sources: Vec<GroundingSource>,

    pub input_tokens: i32,
    pub output_tokens: i32,
    pub finish_reason: FinishReason,
}

/// Trait for text/image generation providers (e.g., Gemini).
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest)
        -> Result<ProviderResponse, ProviderError>;

    /// Cheap readiness probe; does not call the model.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

impl From<ProviderError> for service_core::error::AppError {
    fn from(err: ProviderError) -> Self {
        service_core::error::AppError::ProviderError(err.to_string())
    }
}
