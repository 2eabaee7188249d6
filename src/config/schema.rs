//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Philips TV (JointSpace) upstream.
    pub tv: TvConfig,

    /// Xbox console targets and timings.
    pub xbox: XboxConfig,

    /// Static file fallback.
    pub static_files: StaticFilesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8888").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8888".to_string(),
        }
    }
}

/// JointSpace upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TvConfig {
    /// TV host name or IP address.
    pub host: String,

    /// JointSpace HTTP port.
    pub port: u16,

    /// Total time allowed for one proxied exchange, in seconds.
    pub timeout_secs: u64,

    /// Largest request body forwarded to the TV.
    pub max_body_bytes: usize,
}

impl Default for TvConfig {
    fn default() -> Self {
        Self {
            host: "192.168.31.214".to_string(),
            port: 1925,
            timeout_secs: 5,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl TvConfig {
    /// Base URL of the TV, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Xbox console configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct XboxConfig {
    /// Console unicast address.
    pub address: IpAddr,

    /// SmartGlass UDP port.
    pub port: u16,

    /// Broadcast address used by discover and wake.
    pub broadcast_address: IpAddr,

    /// Receive timeout for `status`, in milliseconds.
    pub status_timeout_ms: u64,

    /// Per-receive timeout for `discover`, in milliseconds.
    pub discover_timeout_ms: u64,

    /// Default delay between press and release, in milliseconds.
    pub hold_time_ms: u64,
}

impl Default for XboxConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::new(192, 168, 31, 58)),
            port: 5050,
            broadcast_address: IpAddr::V4(Ipv4Addr::BROADCAST),
            status_timeout_ms: 1000,
            discover_timeout_ms: 2000,
            hold_time_ms: 100,
        }
    }
}

/// Static file serving for everything outside `/api`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Serve files for GET/HEAD requests outside `/api`.
    pub enabled: bool,

    /// Directory files are served from.
    pub root: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: ".".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
