//! Gemini AI provider implementation.
//!
//! Calls the `generateContent` REST method for text, structured JSON,
//! search-grounded and image generation.

use super::{
    is_valid_model_id, FinishReason, GenerationParams, GenerationRequest, GenerativeProvider,
    GroundingSource, InlineImage, ProviderError, ProviderResponse,
};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const MISSING_KEY_MESSAGE: &str = "GEMINI_API_KEY not set";
const DEFAULT_SOURCE_TITLE: &str = "Source";
const DEFAULT_SOURCE_URI: &str = "#";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<Secret<String>>,
    pub api_base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: Option<Secret<String>>) -> Self {
        Self {
            api_key,
            api_base_url: GEMINI_API_BASE.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Gemini provider.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::NetworkError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Build the API URL for the given model and method. The model must stay
    /// a single path segment under `/models`.
    fn api_url(&self, model: &str, method: &str) -> Result<String, ProviderError> {
        if !is_valid_model_id(model) {
            return Err(ProviderError::InvalidModel(model.to_string()));
        }
        let model = model.strip_prefix("models/").unwrap_or(model);
        Ok(format!(
            "{}/models/{}:{}",
            self.config.api_base_url.trim_end_matches('/'),
            model,
            method
        ))
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().as_str())
            .ok_or_else(|| ProviderError::NotConfigured(MISSING_KEY_MESSAGE.to_string()))
    }
}

/// Build the wire request for a generation call.
fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![ContentPart::Text {
                text: request.prompt.clone(),
                thought: None,
            }],
        }],
        tools: request.params.google_search.then(|| {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        }),
        generation_config: build_generation_config(&request.params),
    }
}

/// Build generation config from parameters; `None` when nothing is set.
fn build_generation_config(params: &GenerationParams) -> Option<GenerationConfig> {
    let config = GenerationConfig {
        response_mime_type: params
            .response_schema
            .as_ref()
            .map(|_| "application/json".to_string()),
        response_schema: params.response_schema.clone(),
        response_modalities: params
            .image_aspect_ratio
            .as_ref()
            .map(|_| vec!["TEXT".to_string(), "IMAGE".to_string()]),
        image_config: params.image_aspect_ratio.as_ref().map(|ratio| ImageConfig {
            aspect_ratio: ratio.clone(),
        }),
    };

    if config.response_schema.is_none() && config.image_config.is_none() {
        None
    } else {
        Some(config)
    }
}

/// Normalize a `generateContent` response. Only the first candidate is read.
fn into_provider_response(
    api_response: GenerateContentResponse,
) -> Result<ProviderResponse, ProviderError> {
    let usage = api_response.usage_metadata.unwrap_or_default();
    let candidate = api_response.candidates.into_iter().next();

    let finish_reason = match candidate
        .as_ref()
        .and_then(|c| c.finish_reason.as_deref())
    {
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") | Some("IMAGE_SAFETY") | Some("PROHIBITED_CONTENT") => {
            FinishReason::ContentFilter
        }
        _ => FinishReason::Complete,
    };

    if finish_reason == FinishReason::ContentFilter {
        return Err(ProviderError::ContentFiltered);
    }

    let (parts, grounding) = match candidate {
        Some(c) => (
            c.content.map(|content| content.parts).unwrap_or_default(),
            c.grounding_metadata,
        ),
        None => (Vec::new(), None),
    };

    let mut text: Option<String> = None;
    let mut images = Vec::new();
    for part in parts {
        match part {
            ContentPart::Text { thought: Some(true), .. } => {}
            ContentPart::Text { text: chunk, .. } => {
                text.get_or_insert_with(String::new).push_str(&chunk);
            }
            ContentPart::InlineData { inline_data } => images.push(InlineImage {
                mime_type: inline_data.mime_type,
                data: inline_data.data,
            }),
            ContentPart::Other(_) => {}
        }
    }

    let sources = grounding
        .and_then(|metadata| metadata.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .map(|web| GroundingSource {
            title: non_empty_or(web.title, DEFAULT_SOURCE_TITLE),
            uri: non_empty_or(web.uri, DEFAULT_SOURCE_URI),
        })
        .collect();

    Ok(ProviderResponse {
        text,
        images,
        sources,
        input_tokens: usage.prompt_token_count.unwrap_or(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0),
        finish_reason,
    })
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        let url = self.api_url(&request.model, "generateContent")?;
        let api_key = self.api_key()?;
        let body = build_request(request);

        tracing::debug!(
            model = %request.model,
            prompt_len = request.prompt.len(),
            google_search = request.params.google_search,
            structured = request.params.response_schema.is_some(),
            image = request.params.image_aspect_ratio.is_some(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        into_provider_response(api_response)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.api_key().map(|_| ())
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,
    },
    InlineData {
        #[serde(rename = "inlineData", alias = "inline_data")]
        inline_data: InlineData,
    },
    /// Function calls, code execution results and other parts we do not use.
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(alias = "mime_type")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}
