use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::models::NutritionSchema;
use crate::services::openrouter::DEFAULT_BASE_URL;

const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout:free";
const DEFAULT_LANGUAGE: &str = "Bahasa Indonesia";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openrouter_api_key: String,
    pub openrouter_model: String,
    pub openrouter_base_url: String,
    pub response_language: String,
    pub nutrition_schema: NutritionSchema,
    pub bind_addr: String,
    pub max_image_bytes: usize,
    pub provider_timeout: Duration,
}

impl AppConfig {
    /// Read configuration from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openrouter_api_key =
            get("OPENROUTER_API_KEY").context("OPENROUTER_API_KEY must be set in .env file")?;

        let nutrition_schema = match get("NUTRITION_SCHEMA") {
            Some(value) => NutritionSchema::from_string(&value)
                .with_context(|| format!("NUTRITION_SCHEMA '{}' is not 'structured' or 'text'", value))?,
            None => NutritionSchema::default(),
        };

        let max_image_bytes = match get("MAX_IMAGE_BYTES") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("MAX_IMAGE_BYTES '{}' is not a byte count", value))?,
            None => DEFAULT_MAX_IMAGE_BYTES,
        };

        let timeout_secs = match get("PROVIDER_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("PROVIDER_TIMEOUT_SECS '{}' is not a number", value))?,
            None => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };

        Ok(Self {
            openrouter_api_key,
            openrouter_model: get("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openrouter_base_url: get("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            response_language: get("RESPONSE_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            nutrition_schema,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            max_image_bytes,
            provider_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
