//! Nominatim base application.
//!
//! This module handles:
//! - Endpoint enumeration and upstream response types
//! - The upstream HTTP client
//! - The route table that forwards every endpoint upstream

pub mod app;
pub mod client;
pub mod types;

pub use app::NominatimApp;
pub use client::NominatimClient;
pub use types::{NominatimEndpoint, StatusResponse, UpstreamResponse};
