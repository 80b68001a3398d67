//! Nominatim front with an always-on liveness endpoint.
//!
//! The base application forwards every public Nominatim endpoint to an
//! upstream server. On top of it the wrapper registers one route of its own:
//!
//! ```text
//! GET /health  ->  200 application/json
//!                  {"status":"online","service":"nominatim"}
//! ```
//!
//! The health endpoint reports process reachability only. It never calls the
//! upstream, so a broken database still answers `online`.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`api`]: Health handler, route registration and composition
//! - [`nominatim`]: Upstream client and the forwarding base application
//! - [`metrics`]: Prometheus recorder and upstream metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod nominatim;
pub mod utils;

pub use config::Config;
pub use error::{Result, WrapperError};
