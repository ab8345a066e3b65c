use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{NewUser, NewVocabularyEntry};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        required(message = "Username is required"),
        length(min = 1, message = "Username is required")
    )]
    pub username: Option<String>,
}

impl CreateUserRequest {
    /// Call after `validate()`; an absent username becomes empty.
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            username: self.username.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddVocabularyRequest {
    #[validate(required(message = "Missing required fields"))]
    pub word: Option<String>,
    #[validate(required(message = "Missing required fields"))]
    pub translation: Option<String>,
    pub example: Option<String>,
    pub source: Option<String>,
}

impl AddVocabularyRequest {
    /// Call after `validate()`; defaults `example` and `source`.
    pub fn into_new_entry(self) -> NewVocabularyEntry {
        NewVocabularyEntry::new(
            self.word.unwrap_or_default(),
            self.translation.unwrap_or_default(),
            self.example,
            self.source,
        )
    }
}
