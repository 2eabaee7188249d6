//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let config = parse_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Read and deserialize a TOML file without semantic checks. Callers that
/// layer overrides on top validate the merged result themselves.
pub fn parse_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Override fields from `RELAY_*` environment variables.
pub fn apply_env_overrides(config: &mut RelayConfig) -> Result<(), ConfigError> {
    apply_overrides(config, |var| std::env::var(var).ok())
}

/// Override fields from an arbitrary variable lookup.
pub fn apply_overrides<F>(config: &mut RelayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("RELAY_BIND") {
        config.listener.bind_address = v;
    }
    if let Some(v) = lookup("RELAY_TV_HOST") {
        config.tv.host = v;
    }
    if let Some(v) = lookup("RELAY_TV_PORT") {
        config.tv.port = parse_var("RELAY_TV_PORT", v)?;
    }
    if let Some(v) = lookup("RELAY_XBOX_IP") {
        config.xbox.address = parse_var("RELAY_XBOX_IP", v)?;
    }
    if let Some(v) = lookup("RELAY_XBOX_PORT") {
        config.xbox.port = parse_var("RELAY_XBOX_PORT", v)?;
    }
    if let Some(v) = lookup("RELAY_STATIC_ROOT") {
        config.static_files.root = v;
    }
    if let Some(v) = lookup("RELAY_LOG_LEVEL") {
        config.observability.log_level = v;
    }
    Ok(())
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}
