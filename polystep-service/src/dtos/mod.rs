//! Request and response bodies for the HTTP API.

pub mod ai;
pub mod vocabulary;

pub use ai::{
    GenerateRequest, GrammarResearchRequest, ImageResponse, ReadingPassageRequest,
    ResearchResponse, TextResponse, TranslateRequest, VisualizeRequest,
};
pub use vocabulary::{AddVocabularyRequest, CreateUserRequest, HealthResponse};
