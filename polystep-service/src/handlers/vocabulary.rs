//! Shared vocabulary list.

use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;
use service_core::extract::ValidatedJson;

use crate::{dtos::AddVocabularyRequest, models::VocabularyEntry, AppState};

pub async fn list_vocabulary(
    State(state): State<AppState>,
) -> Result<Json<Vec<VocabularyEntry>>, AppError> {
    let entries = state.db.list_vocabulary().await?;
    Ok(Json(entries))
}

pub async fn add_vocabulary(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AddVocabularyRequest>,
) -> Result<(StatusCode, Json<VocabularyEntry>), AppError> {
    let entry = payload.into_new_entry();

    tracing::info!(word = %entry.word, source = %entry.source, "Adding vocabulary entry");

    let saved = state.db.add_vocabulary(&entry).await?;

    Ok((StatusCode::CREATED, Json(saved)))
}
