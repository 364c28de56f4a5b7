//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `BRAINSTORM` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use brainstorm_core::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Using model {}", config.ai.model);
//! ```

mod ai;
mod error;
mod logging;
mod storage;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

use crate::domain::similarity::SimilarityPolicy;

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads; whether it
/// validates depends on the selected language-model adapter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Language-model adapter and connection settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Similarity thresholds for scoring and reconciliation
    #[serde(default)]
    pub similarity: SimilarityPolicy,

    /// Where canonical items are kept
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log level and output format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `BRAINSTORM` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `BRAINSTORM__AI__ANTHROPIC_API_KEY=...` -> `ai.anthropic_api_key = ...`
    /// - `BRAINSTORM__SIMILARITY__HIGH_THRESHOLD=0.7` -> `similarity.high_threshold = 0.7`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("BRAINSTORM")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.similarity.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "BRAINSTORM__AI__PROVIDER",
        "BRAINSTORM__AI__ANTHROPIC_API_KEY",
        "BRAINSTORM__AI__MAX_TOKENS",
        "BRAINSTORM__SIMILARITY__MIN_WORD_LENGTH",
        "BRAINSTORM__SIMILARITY__HIGH_THRESHOLD",
        "BRAINSTORM__SIMILARITY__LOW_THRESHOLD",
        "BRAINSTORM__STORAGE__DATA_DIR",
        "BRAINSTORM__LOGGING__JSON",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::Anthropic);
        assert_eq!(config.similarity, SimilarityPolicy::default());
        assert!(!config.storage.is_persistent());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("BRAINSTORM__AI__PROVIDER", "mock");
        env::set_var("BRAINSTORM__AI__MAX_TOKENS", "512");
        env::set_var("BRAINSTORM__SIMILARITY__MIN_WORD_LENGTH", "4");
        env::set_var("BRAINSTORM__SIMILARITY__HIGH_THRESHOLD", "0.7");
        env::set_var("BRAINSTORM__STORAGE__DATA_DIR", "/tmp/brainstorm");
        env::set_var("BRAINSTORM__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::Mock);
        assert_eq!(config.ai.max_tokens, Some(512));
        assert_eq!(config.similarity.min_word_length, 4);
        assert_eq!(config.similarity.high_threshold, 0.7);
        assert_eq!(config.similarity.low_threshold, 0.3);
        assert!(config.storage.is_persistent());
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_api_key_for_anthropic() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unordered_thresholds() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("BRAINSTORM__AI__PROVIDER", "mock");
        env::set_var("BRAINSTORM__SIMILARITY__LOW_THRESHOLD", "0.9");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidSimilarity(_))
        ));
    }
}
