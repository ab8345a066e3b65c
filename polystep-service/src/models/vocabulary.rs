//! Vocabulary entries shared by all learners.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Source tag for entries typed in by the learner, as opposed to entries
/// saved from an AI response.
pub const DEFAULT_SOURCE: &str = "manual";

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: i64,
    pub word: String,
    pub translation: String,
    pub example: String,
    pub source: String,
}

/// Input for adding a vocabulary entry, with optional fields already
/// defaulted.
#[derive(Debug, Clone)]
pub struct NewVocabularyEntry {
    pub word: String,
    pub translation: String,
    pub example: String,
    pub source: String,
}

impl NewVocabularyEntry {
    pub fn new(
        word: impl Into<String>,
        translation: impl Into<String>,
        example: Option<String>,
        source: Option<String>,
    ) -> Self {
        Self {
            word: word.into(),
            translation: translation.into(),
            example: example.unwrap_or_default(),
            source: source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        }
    }
}
