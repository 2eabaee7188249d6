//! Configuration validation.
//!
//! Semantic checks only; serde already rejected malformed values. Every
//! problem is reported, not just the first one.

use std::net::SocketAddr;

use crate::config::schema::RelayConfig;

/// Longest accepted button hold time.
pub const MAX_HOLD_TIME_MS: u64 = 5_000;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.tv.host.trim().is_empty() {
        errors.push(ValidationError::new("tv.host", "must not be empty"));
    }
    if config.tv.port == 0 {
        errors.push(ValidationError::new("tv.port", "must not be 0"));
    }
    if config.tv.timeout_secs == 0 {
        errors.push(ValidationError::new("tv.timeout_secs", "must be greater than 0"));
    }

    if config.xbox.port == 0 {
        errors.push(ValidationError::new("xbox.port", "must not be 0"));
    }
    if config.xbox.status_timeout_ms == 0 {
        errors.push(ValidationError::new("xbox.status_timeout_ms", "must be greater than 0"));
    }
    if config.xbox.discover_timeout_ms == 0 {
        errors.push(ValidationError::new("xbox.discover_timeout_ms", "must be greater than 0"));
    }
    if config.xbox.hold_time_ms > MAX_HOLD_TIME_MS {
        errors.push(ValidationError::new(
            "xbox.hold_time_ms",
            format!("must be at most {MAX_HOLD_TIME_MS}"),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
