use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::services::providers::{is_valid_model_id, GroundingSource};

/// An empty model falls back to the configured default.
fn validate_model_id(model: &str) -> Result<(), ValidationError> {
    if model.is_empty() || is_valid_model_id(model) {
        return Ok(());
    }
    let mut err = ValidationError::new("model_id");
    err.message = Some(Cow::from("Invalid model"));
    Err(err)
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(
        required(message = "Prompt is required"),
        length(min = 1, message = "Prompt is required")
    )]
    pub prompt: Option<String>,
    /// Overrides the configured text model.
    #[validate(custom(function = "validate_model_id"))]
    pub model: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TranslateRequest {
    #[validate(
        required(message = "Text is required"),
        length(min = 1, message = "Text is required")
    )]
    pub text: Option<String>,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    /// Ask for a short grammatical note alongside the translation.
    #[serde(default)]
    pub analysis: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GrammarResearchRequest {
    #[validate(
        required(message = "Topic is required"),
        length(min = 1, message = "Topic is required")
    )]
    pub topic: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VisualizeRequest {
    #[validate(
        required(message = "Prompt is required"),
        length(min = 1, message = "Prompt is required")
    )]
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReadingPassageRequest {
    pub language: Option<String>,
    /// CEFR level, "B1" when absent.
    pub level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ResearchResponse {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageResponse {
    pub image_url: String,
}
