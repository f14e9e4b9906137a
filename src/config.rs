use dotenvy::dotenv;
use std::env;

use crate::error::AppError;
use crate::models::{MatchStrategy, TextPolicy};

/// Runtime configuration for a reconciliation run. Defaults reproduce the
/// production constants; every field can be overridden through `RECON_*`
/// environment variables (a `.env` file is honored when present).
#[derive(Debug, Clone)]
pub struct Config {
    /// Marker meaning "not applicable" in the sentinel columns.
    pub sentinel_value: String,
    /// Columns that participate in the all-or-nothing row removal rule.
    pub sentinel_columns: Vec<String>,
    /// Known-junk columns dropped from the input table when present.
    pub drop_columns: Vec<String>,
    pub match_strategy: MatchStrategy,
    /// Fuzzy score at or above which a row is classified MATCH.
    pub match_threshold: u32,
    /// Replace semicolons with spaces during text normalization.
    pub strip_semicolons: bool,
    pub text_policy: TextPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sentinel_value: "N".to_string(),
            sentinel_columns: vec![
                "department of education".to_string(),
                "state board".to_string(),
                "state superintendent".to_string(),
                "superintendent of public instruction".to_string(),
            ],
            drop_columns: vec![
                "unnamed: 0".to_string(),
                "unnamed: 10".to_string(),
                "helper column".to_string(),
                "section".to_string(),
                "status".to_string(),
            ],
            match_strategy: MatchStrategy::Fuzzy,
            match_threshold: 90,
            strip_semicolons: true,
            text_policy: TextPolicy::Coerce,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, AppError> {
        // Load .env file first
        dotenv().ok();

        let mut config = Config::default();

        if let Ok(value) = env::var("RECON_SENTINEL_VALUE") {
            config.sentinel_value = value;
        }
        if let Ok(value) = env::var("RECON_SENTINEL_COLUMNS") {
            config.sentinel_columns = parse_column_list(&value);
        }
        if let Ok(value) = env::var("RECON_DROP_COLUMNS") {
            config.drop_columns = parse_column_list(&value);
        }
        if let Ok(value) = env::var("RECON_MATCH_STRATEGY") {
            config.match_strategy = value.parse().map_err(AppError::Config)?;
        }
        if let Ok(value) = env::var("RECON_MATCH_THRESHOLD") {
            let threshold: u32 = value
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("invalid RECON_MATCH_THRESHOLD: {}", value)))?;
            if threshold > 100 {
                return Err(AppError::Config(format!(
                    "RECON_MATCH_THRESHOLD must be in 0..=100, got {}",
                    threshold
                )));
            }
            config.match_threshold = threshold;
        }
        if let Ok(value) = env::var("RECON_STRIP_SEMICOLONS") {
            config.strip_semicolons = matches!(value.trim(), "1" | "true" | "yes");
        }
        if let Ok(value) = env::var("RECON_TEXT_POLICY") {
            config.text_policy = value.parse().map_err(AppError::Config)?;
        }

        Ok(config)
    }
}

fn parse_column_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|col| col.trim().to_lowercase())
        .filter(|col| !col.is_empty())
        .collect()
}
