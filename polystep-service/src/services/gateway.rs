//! AI gateway: turns study-tool requests into provider calls and shapes the
//! answers for the HTTP layer.
//!
//! Inputs are assumed validated at the HTTP boundary. Every operation is a
//! single provider round-trip with no retry.

use crate::config::ModelConfig;
use crate::dtos::{ImageResponse, ResearchResponse, TextResponse};
use crate::services::metrics::record_provider_call;
use crate::services::prompts;
use crate::services::providers::{
    FinishReason, GenerationParams, GenerationRequest, GenerativeProvider, ProviderError,
    ProviderResponse,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

pub const DEFAULT_TARGET_LANGUAGE: &str = "English";
pub const DEFAULT_LEVEL: &str = "B1";
pub const IMAGE_ASPECT_RATIO: &str = "16:9";
/// Stand-in when the caller does not name the source language.
const UNSPECIFIED_SOURCE_LANGUAGE: &str = "original";
/// Stand-in when the caller does not name the study language.
const UNSPECIFIED_LANGUAGE: &str = "the target language";

#[derive(Clone)]
pub struct AiGateway {
    provider: Arc<dyn GenerativeProvider>,
    models: ModelConfig,
}

impl AiGateway {
    pub fn new(provider: Arc<dyn GenerativeProvider>, models: ModelConfig) -> Self {
        Self { provider, models }
    }

    /// Free-form generation with the given model, or the default text model.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate(
        &self,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<TextResponse, ProviderError> {
        let model = model
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.models.text_model);
        let response = self
            .call("generate", GenerationRequest::new(model, prompt))
            .await?;

        Ok(TextResponse {
            text: response_text(response)?,
        })
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
        analysis: bool,
    ) -> Result<TextResponse, ProviderError> {
        let template = if analysis {
            prompts::TRANSLATE_WITH_ANALYSIS
        } else {
            prompts::TRANSLATE
        };
        let prompt = prompts::render(
            template,
            &[
                (
                    "source_lang",
                    source_lang.unwrap_or(UNSPECIFIED_SOURCE_LANGUAGE),
                ),
                ("target_lang", target_lang.unwrap_or(DEFAULT_TARGET_LANGUAGE)),
                ("text", text),
            ],
        );

        let response = self
            .call(
                "translate",
                GenerationRequest::new(&self.models.text_model, prompt),
            )
            .await?;

        Ok(TextResponse {
            text: response_text(response)?,
        })
    }

    /// Search-grounded usage examples. `sources` is empty, never absent, when
    /// the provider returns no citations.
    #[instrument(skip(self))]
    pub async fn grammar_research(
        &self,
        topic: &str,
        language: Option<&str>,
    ) -> Result<ResearchResponse, ProviderError> {
        let prompt = prompts::render(
            prompts::GRAMMAR_RESEARCH,
            &[
                ("topic", topic),
                (
                    "language",
                    language.unwrap_or(UNSPECIFIED_LANGUAGE),
                ),
            ],
        );
        let request =
            GenerationRequest::new(&self.models.text_model, prompt).with_params(GenerationParams {
                google_search: true,
                ..GenerationParams::default()
            });

        let mut response = self.call("grammar_research", request).await?;
        let sources = std::mem::take(&mut response.sources);

        Ok(ResearchResponse {
            text: response_text(response)?,
            sources,
        })
    }

    /// Illustrate a scene; returns the first generated image as a data URI.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn visualize(&self, prompt: &str) -> Result<ImageResponse, ProviderError> {
        let prompt = prompts::render(prompts::VISUALIZE, &[("prompt", prompt)]);
        let request =
            GenerationRequest::new(&self.models.image_model, prompt).with_params(GenerationParams {
                image_aspect_ratio: Some(IMAGE_ASPECT_RATIO.to_string()),
                ..GenerationParams::default()
            });

        let response = self.call("visualize", request).await?;
        let image = response
            .images
            .into_iter()
            .next()
            .ok_or(ProviderError::NoImage)?;

        Ok(ImageResponse {
            image_url: format!("data:image/png;base64,{}", image.data),
        })
    }

    /// Reading passage with comprehension questions. The structured JSON is
    /// passed through as text without further parsing.
    #[instrument(skip(self))]
    pub async fn reading_passage(
        &self,
        language: Option<&str>,
        level: Option<&str>,
    ) -> Result<TextResponse, ProviderError> {
        let prompt = prompts::render(
            prompts::READING_PASSAGE,
            &[
                ("language", language.unwrap_or(UNSPECIFIED_LANGUAGE)),
                ("level", level.unwrap_or(DEFAULT_LEVEL)),
            ],
        );
        let request =
            GenerationRequest::new(&self.models.text_model, prompt).with_params(GenerationParams {
                response_schema: Some(prompts::reading_passage_schema()),
                ..GenerationParams::default()
            });

        let response = self.call("reading_passage", request).await?;

        Ok(TextResponse {
            text: response_text(response)?,
        })
    }

    async fn call(
        &self,
        capability: &str,
        request: GenerationRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        let started = Instant::now();
        let result = self.provider.generate(&request).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(response) => {
                record_provider_call(capability, &request.model, "success", elapsed);
                tracing::info!(
                    capability,
                    model = %request.model,
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Provider call completed"
                );
                if response.finish_reason == FinishReason::Length {
                    tracing::warn!(capability, "Provider output hit the token limit");
                }
            }
            Err(e) => {
                record_provider_call(capability, &request.model, e.kind(), elapsed);
                tracing::error!(
                    capability,
                    model = %request.model,
                    error = %e,
                    "Provider call failed"
                );
            }
        }

        result
    }
}

fn response_text(response: ProviderResponse) -> Result<String, ProviderError> {
    response.text.ok_or(ProviderError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::MockProvider;
    use crate::services::providers::{GroundingSource, InlineImage};

    fn models() -> ModelConfig {
        ModelConfig {
            text_model: "text-model".to_string(),
            image_model: "image-model".to_string(),
        }
    }

    fn gateway(provider: Arc<MockProvider>) -> AiGateway {
        AiGateway::new(provider, models())
    }

    #[tokio::test]
    async fn generate_uses_default_model_unless_overridden() {
        let provider = Arc::new(MockProvider::with_text("hola"));
        let gateway = gateway(provider.clone());

        gateway.generate("say hi", None).await.unwrap();
        let response = gateway.generate("say hi", Some("custom-model")).await.unwrap();

        assert_eq!(response.text, "hola");
        let requests = provider.requests();
        assert_eq!(requests[0].model, "text-model");
        assert_eq!(requests[0].prompt, "say hi");
        assert_eq!(requests[1].model, "custom-model");
    }

    #[tokio::test]
    async fn translate_defaults_target_and_only_asks_for_notes_on_analysis() {
        let provider = Arc::new(MockProvider::with_text("good morning"));
        let gateway = gateway(provider.clone());

        gateway
            .translate("buenos días", Some("Spanish"), None, false)
            .await
            .unwrap();
        gateway
            .translate("buenos días", Some("Spanish"), Some("German"), true)
            .await
            .unwrap();

        let requests = provider.requests();
        assert!(requests[0].prompt.contains("Spanish text to English"));
        assert!(requests[0].prompt.contains("\"buenos días\""));
        assert!(!requests[0].prompt.contains("grammatical note"));
        assert!(requests[1].prompt.contains("Spanish text to German"));
        assert!(requests[1].prompt.contains("grammatical note"));
    }

    #[tokio::test]
    async fn grammar_research_enables_search_and_relays_sources() {
        let provider = Arc::new(MockProvider::new(ProviderResponse {
            text: Some("1. ...".to_string()),
            sources: vec![GroundingSource {
                title: "RAE".to_string(),
                uri: "https://rae.es".to_string(),
            }],
            ..ProviderResponse::default()
        }));
        let gateway = gateway(provider.clone());

        let response = gateway
            .grammar_research("subjunctive", Some("Spanish"))
            .await
            .unwrap();

        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].title, "RAE");
        let request = &provider.requests()[0];
        assert!(request.params.google_search);
        assert!(request.prompt.contains("\"subjunctive\" is used in Spanish"));
    }

    #[tokio::test]
    async fn grammar_research_without_citations_has_empty_sources() {
        let provider = Arc::new(MockProvider::with_text("examples"));
        let response = gateway(provider)
            .grammar_research("ser vs estar", None)
            .await
            .unwrap();

        assert!(response.sources.is_empty());
        assert_eq!(
            serde_json::to_value(&response).unwrap()["sources"],
            serde_json::json!([])
        );
    }

    #[tokio::test]
    async fn visualize_wraps_prompt_and_returns_data_uri() {
        let provider = Arc::new(MockProvider::new(ProviderResponse {
            images: vec![
                InlineImage {
                    mime_type: "image/png".to_string(),
                    data: "AAAA".to_string(),
                },
                InlineImage {
                    mime_type: "image/png".to_string(),
                    data: "BBBB".to_string(),
                },
            ],
            ..ProviderResponse::default()
        }));
        let gateway = gateway(provider.clone());

        let response = gateway.visualize("a tapas bar").await.unwrap();

        assert_eq!(response.image_url, "data:image/png;base64,AAAA");
        let request = &provider.requests()[0];
        assert_eq!(request.model, "image-model");
        assert_eq!(
            request.prompt,
            "A vibrant, photorealistic cultural scene for a language learner: a tapas bar"
        );
        assert_eq!(request.params.image_aspect_ratio.as_deref(), Some("16:9"));
    }

    #[tokio::test]
    async fn visualize_without_image_is_no_image_error() {
        let provider = Arc::new(MockProvider::with_text("I cannot draw that"));
        let err = gateway(provider).visualize("x").await.unwrap_err();
        assert_eq!(err, ProviderError::NoImage);
        assert_eq!(err.to_string(), "No image generated");
    }

    #[tokio::test]
    async fn reading_passage_requests_structured_output_at_default_level() {
        let raw = r#"{"title":"T","passage":"P","questions":[]}"#;
        let provider = Arc::new(MockProvider::with_text(raw));
        let gateway = gateway(provider.clone());

        let response = gateway.reading_passage(Some("French"), None).await.unwrap();

        assert_eq!(response.text, raw);
        let request = &provider.requests()[0];
        assert!(request.prompt.contains("in French at B1 level"));
        assert_eq!(
            request.params.response_schema,
            Some(prompts::reading_passage_schema())
        );
    }

    #[tokio::test]
    async fn reading_passage_without_language_still_calls_provider() {
        let provider = Arc::new(MockProvider::with_text("{}"));
        let gateway = gateway(provider.clone());

        gateway.reading_passage(None, Some("A2")).await.unwrap();

        let prompt = &provider.requests()[0].prompt;
        assert!(prompt.contains("in the target language at A2 level"));
    }

    #[tokio::test]
    async fn truncated_output_is_still_returned() {
        let provider = Arc::new(MockProvider::new(ProviderResponse {
            text: Some("partial".to_string()),
            finish_reason: FinishReason::Length,
            ..ProviderResponse::default()
        }));
        let response = gateway(provider).generate("hi", None).await.unwrap();
        assert_eq!(response.text, "partial");
    }

    #[tokio::test]
    async fn provider_failure_is_surfaced_unchanged() {
        let provider = Arc::new(MockProvider::failing(ProviderError::NotConfigured(
            "GEMINI_API_KEY not set".to_string(),
        )));
        let err = gateway(provider).generate("hi", None).await.unwrap_err();
        assert_eq!(err.to_string(), "GEMINI_API_KEY not set");
    }

    #[tokio::test]
    async fn response_without_text_is_an_error() {
        let provider = Arc::new(MockProvider::new(ProviderResponse::default()));
        let err = gateway(provider).generate("hi", None).await.unwrap_err();
        assert_eq!(err, ProviderError::EmptyResponse);
    }
}
