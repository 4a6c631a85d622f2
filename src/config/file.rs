//! Configuration file management for chatkey.
//!
//! This module handles loading application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use anyhow::anyhow;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Settings for the API key validator.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Base URL of the Gemini API (no trailing path)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Seconds to wait for the provider before giving up
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ChatkeyConfig {
    /// Key restored by `reset`; overridden by the `GOOGLE_API_KEY` environment variable
    #[serde(default)]
    pub default_api_key: Option<String>,
    #[serde(default)]
    pub validator: ValidatorConfig,
}

impl ChatkeyConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        let config_content = fs::read_to_string(&config_path)
            .map_err(|e| anyhow!("Failed to read {}: {e}", config_path.display()))?;
        Self::parse(&config_content)
    }

    /// Loads configuration, falling back to defaults if it cannot be read.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default configuration: {e}");
                Self::default()
            }
        }
    }

    /// Parses configuration from TOML text.
    ///
    /// The `config_version` line written by setup is ignored here.
    ///
    /// # Errors
    /// - If the TOML is malformed
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow!("Invalid configuration: {e}"))
    }
}

/// Retrieves the path to the config file.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("chatkey");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("chatkey.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = ChatkeyConfig::parse("config_version = \"0.1.0\"\n").unwrap();
        assert_eq!(config, ChatkeyConfig::default());
        assert_eq!(config.validator.timeout_secs, 15);
    }

    #[test]
    fn test_parse_full_config() {
        let config = ChatkeyConfig::parse(
            r#"
default_api_key = "AIza-default"

[validator]
endpoint = "http://localhost:8080"
timeout_secs = 3
"#,
        )
        .unwrap();

        assert_eq!(config.default_api_key.as_deref(), Some("AIza-default"));
        assert_eq!(config.validator.endpoint, "http://localhost:8080");
        assert_eq!(config.validator.timeout_secs, 3);
    }

    #[test]
    fn test_bundled_template_parses() {
        let template = include_str!("../../environments/chatkey.toml");
        let config = ChatkeyConfig::parse(template).unwrap();
        assert_eq!(config.default_api_key, None);
        assert_eq!(config.validator, ValidatorConfig::default());
    }

    #[test]
    fn test_malformed_config_is_error() {
        assert!(ChatkeyConfig::parse("[validator\n").is_err());
    }
}
