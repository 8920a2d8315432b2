//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `api.base_url`.
pub const ENV_API_URL: &str = "CMS_API_URL";
/// Overrides `api.api_token`.
pub const ENV_API_TOKEN: &str = "CMS_API_TOKEN";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Explicit settings that win over both the file and the environment,
/// e.g. command-line flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl ConfigOverrides {
    fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.base_url {
            config.api.base_url = url.clone();
        }
        if let Some(token) = &self.api_token {
            config.api.api_token = Some(token.clone());
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.api.timeout_ms = timeout_ms;
        }
        config
    }
}

/// Load, apply environment overrides and validate a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    load(Some(path), &ConfigOverrides::default())
}

/// Defaults plus environment overrides, validated. Used when no file is given.
pub fn load_default() -> Result<ClientConfig, ConfigError> {
    load(None, &ConfigOverrides::default())
}

/// File (or defaults), then environment, then `overrides`. Validation runs
/// once, on the merged result.
pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<ClientConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => ClientConfig::default(),
    };
    let config = apply_env_overrides(config, |key| std::env::var(key).ok());
    finish(overrides.apply(config))
}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<ClientConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply `CMS_API_URL` / `CMS_API_TOKEN` using `lookup` to read variables.
pub fn apply_env_overrides<F>(mut config: ClientConfig, lookup: F) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL) {
        config.api.base_url = url;
    }
    if let Some(token) = lookup(ENV_API_TOKEN) {
        config.api.api_token = Some(token);
    }
    config
}

fn finish(config: ClientConfig) -> Result<ClientConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
