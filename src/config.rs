//! Configuration management for BookNest

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct LibraryConfig {
    /// Path of the persisted library file (single JSON document)
    pub data_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoanConfig {
    pub default_days: i64,
    pub max_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenLibraryConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub default_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub loans: LoanConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub open_library: OpenLibraryConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix BOOKNEST_)
            .add_source(
                Environment::with_prefix("BOOKNEST")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override data file path from LIBRARY_DATA_FILE env var if present
            .set_override_option(
                "library.data_file",
                env::var("LIBRARY_DATA_FILE").ok(),
            )?
            // Override assistant key from GOOGLE_API_KEY env var if present
            .set_override_option(
                "assistant.api_key",
                env::var("GOOGLE_API_KEY").ok(),
            )?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            data_file: "library_data.json".to_string(),
        }
    }
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self {
            default_days: 14,
            max_days: 90,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
            api_key: None,
        }
    }
}

impl Default for OpenLibraryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openlibrary.org".to_string(),
            timeout_seconds: 10,
            default_limit: 10,
        }
    }
}
