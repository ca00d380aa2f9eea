use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::collection::PipelineSettings;
use crate::ranking::ScoringWeights;
use crate::requirements::ExtractorSettings;

const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// Invalid tuning values, rejected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Scoring weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },

    #[error("Scoring weight '{name}' must be a non-negative number, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("'{key}' must be greater than zero")]
    NotPositive { key: &'static str },
}

/// Application configuration loaded from environment variables.
/// Every variable is optional; defaults are listed next to each read below.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Request body cap for document uploads.
    pub max_upload_bytes: usize,
    pub pipeline: PipelineSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = PipelineSettings::default();
        let default_weights = ScoringWeights::default();

        let weights = ScoringWeights::new(
            optional_env("DIGEST_WEIGHT_SIMILARITY", default_weights.similarity)?,
            optional_env("DIGEST_WEIGHT_TITLE", default_weights.title_match)?,
            optional_env("DIGEST_WEIGHT_LENGTH", default_weights.length_fit)?,
        )?;

        let pipeline = PipelineSettings {
            top_k: positive("DIGEST_TOP_K", optional_env("DIGEST_TOP_K", defaults.top_k)?)?,
            max_sections: positive(
                "DIGEST_MAX_SECTIONS",
                optional_env("DIGEST_MAX_SECTIONS", defaults.max_sections)?,
            )?,
            max_subsections: positive(
                "DIGEST_MAX_SUBSECTIONS",
                optional_env("DIGEST_MAX_SUBSECTIONS", defaults.max_subsections)?,
            )?,
            parse_timeout: Duration::from_secs(positive(
                "DIGEST_PARSE_TIMEOUT_SECS",
                optional_env("DIGEST_PARSE_TIMEOUT_SECS", defaults.parse_timeout.as_secs())?,
            )?),
            weights,
            extractor: ExtractorSettings {
                domain_min_confidence: optional_env(
                    "DIGEST_DOMAIN_MIN_CONFIDENCE",
                    defaults.extractor.domain_min_confidence,
                )?,
                ..defaults.extractor
            },
        };

        Ok(Config {
            port: optional_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: positive(
                "DIGEST_MAX_UPLOAD_MB",
                optional_env("DIGEST_MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB)?,
            )? * 1024
                * 1024,
            pipeline,
        })
    }
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn positive<T>(key: &'static str, value: T) -> Result<T, ConfigError>
where
    T: PartialOrd + Default,
{
    if value > T::default() {
        Ok(value)
    } else {
        Err(ConfigError::NotPositive { key })
    }
}
