use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite://polystep.db?mode=rwc";
/// Serverless hosts only allow writes under /tmp.
const SERVERLESS_DATABASE_URL: &str = "sqlite:///tmp/polystep.db?mode=rwc";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

#[derive(Debug, Clone, Deserialize)]
pub struct PolystepConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub models: ModelConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model for free-form, translation, research and reading-passage calls.
    pub text_model: String,
    /// Model for image generation.
    pub image_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// Missing keys do not stop the service; AI endpoints report them per call.
    pub api_key: Option<Secret<String>>,
    pub api_base_url: String,
    pub timeout_seconds: u64,
}

impl PolystepConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let default_database_url = if env::var("VERCEL_REGION").is_ok() {
            SERVERLESS_DATABASE_URL
        } else {
            DEFAULT_DATABASE_URL
        };

        Ok(PolystepConfig {
            common: common_config,
            service_name: get_env("SERVICE_NAME", Some("polystep-service"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", Some(default_database_url), is_prod)?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5)?,
            },
            models: ModelConfig {
                text_model: get_env("GEMINI_TEXT_MODEL", Some("gemini-3-flash-preview"), is_prod)?,
                image_model: get_env(
                    "GEMINI_IMAGE_MODEL",
                    Some("gemini-2.5-flash-image"),
                    is_prod,
                )?,
            },
            google: GoogleConfig {
                api_key: env::var("GEMINI_API_KEY")
                    .ok()
                    .filter(|key| !key.is_empty())
                    .map(Secret::new),
                api_base_url: get_env(
                    "GEMINI_API_BASE_URL",
                    Some(DEFAULT_GEMINI_API_BASE),
                    is_prod,
                )?,
                timeout_seconds: parse_env("GEMINI_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value '{}': {}", key, raw, e))
        }),
        Err(_) => Ok(default),
    }
}
