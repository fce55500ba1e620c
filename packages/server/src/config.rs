use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use analysis::AnalysisMode;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: Option<String>,
    pub use_mock_ai: bool,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            use_mock_ai: env::var("USE_MOCK_AI")
                .map(|v| v == "true")
                .unwrap_or(false),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "reefai".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Resolve the analysis mode once at startup.
    ///
    /// Missing API key or an explicit mock flag selects mock mode; handlers
    /// never re-read the environment per request.
    pub fn analysis_mode(&self) -> AnalysisMode {
        if self.use_mock_ai || self.openai_api_key.is_none() {
            AnalysisMode::Mock
        } else {
            AnalysisMode::Live
        }
    }
}
