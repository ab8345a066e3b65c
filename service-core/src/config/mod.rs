use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Server settings shared by every service binary.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load `.env`, then `.env.local`, then the optional `configuration` file and
    /// `APP__*` variables (e.g. `APP__PORT=5000`).
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        dotenvy::from_filename(".env.local").ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
