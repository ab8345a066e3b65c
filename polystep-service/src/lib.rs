pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use config::PolystepConfig;
use services::{AiGateway, Database};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: PolystepConfig,
    pub db: Database,
    pub gateway: AiGateway,
}

impl AppState {
    pub fn new(config: PolystepConfig, db: Database, gateway: AiGateway) -> Self {
        Self {
            config,
            db,
            gateway,
        }
    }
}
