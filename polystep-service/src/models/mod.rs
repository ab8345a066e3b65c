//! Domain models for the polystep service.

pub mod user;
pub mod vocabulary;

pub use user::{NewUser, User};
pub use vocabulary::{NewVocabularyEntry, VocabularyEntry, DEFAULT_SOURCE};
