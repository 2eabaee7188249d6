//! Local-network remote-control relay.
//!
//! One HTTP port for a browser remote: `/api/*` calls are proxied to a
//! Philips TV's JointSpace API, `/api/xbox/*` calls become best-effort
//! SmartGlass-style UDP datagrams, and everything else is served from a
//! static directory.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod tv;
pub mod xbox;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
