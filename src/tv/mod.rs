//! Philips TV (JointSpace) proxy subsystem.
//!
//! # Data Flow
//! ```text
//! /api/<tv-path> (GET or POST)
//!     → proxy.rs (rewrite to http://<tv>:<port>/<tv-path>, 5s budget)
//!     → TV responds: status + body mirrored
//!     → TV unreachable / timeout: 500 {"error": ...}
//! ```

pub mod proxy;

pub use proxy::{ProxyError, TvProxy, Upstream};
