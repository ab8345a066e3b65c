pub mod database;
pub mod gateway;
pub mod metrics;
pub mod prompts;
pub mod providers;

pub use database::Database;
pub use gateway::AiGateway;
