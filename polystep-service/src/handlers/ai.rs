//! Study tools backed by the generative provider.
//!
//! Required fields are checked by [`ValidatedJson`] before the gateway is
//! reached, so a rejected request never costs a provider call.

use axum::{extract::State, Json};
use service_core::error::AppError;
use service_core::extract::ValidatedJson;

use crate::{
    dtos::{
        GenerateRequest, GrammarResearchRequest, ImageResponse, ReadingPassageRequest,
        ResearchResponse, TextResponse, TranslateRequest, VisualizeRequest,
    },
    AppState,
};

pub async fn generate(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GenerateRequest>,
) -> Result<Json<TextResponse>, AppError> {
    let prompt = payload.prompt.unwrap_or_default();
    let response = state
        .gateway
        .generate(&prompt, payload.model.as_deref())
        .await?;

    Ok(Json(response))
}

pub async fn translate(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TranslateRequest>,
) -> Result<Json<TextResponse>, AppError> {
    let text = payload.text.unwrap_or_default();
    let response = state
        .gateway
        .translate(
            &text,
            payload.source_lang.as_deref(),
            payload.target_lang.as_deref(),
            payload.analysis,
        )
        .await?;

    Ok(Json(response))
}

pub async fn grammar_research(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GrammarResearchRequest>,
) -> Result<Json<ResearchResponse>, AppError> {
    let topic = payload.topic.unwrap_or_default();
    let response = state
        .gateway
        .grammar_research(&topic, payload.language.as_deref())
        .await?;

    Ok(Json(response))
}

pub async fn visualize(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VisualizeRequest>,
) -> Result<Json<ImageResponse>, AppError> {
    let prompt = payload.prompt.unwrap_or_default();
    let response = state.gateway.visualize(&prompt).await?;

    Ok(Json(response))
}

pub async fn reading_passage(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ReadingPassageRequest>,
) -> Result<Json<TextResponse>, AppError> {
    let response = state
        .gateway
        .reading_passage(payload.language.as_deref(), payload.level.as_deref())
        .await?;

    Ok(Json(response))
}
