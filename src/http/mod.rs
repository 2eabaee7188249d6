//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → cors.rs (OPTIONS answered here; allow-origin added to everything)
//!     → api.rs (/api/xbox/* → bridge, other /api/* → TV proxy)
//!     → server.rs static fallback (GET/HEAD files, else 404)
//! ```

pub mod api;
pub mod cors;
pub mod server;

pub use server::{AppState, HttpServer};
