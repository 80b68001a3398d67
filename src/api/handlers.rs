//! HTTP handlers owned by the wrapper itself.

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, MethodRouter},
    Json,
};
use serde::Serialize;

/// Path the liveness endpoint is bound to.
pub const HEALTH_PATH: &str = "/health";

/// Health check response.
///
/// Serialises to exactly `{"status":"online","service":"nominatim"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Always "online".
    pub status: &'static str,
    /// Always "nominatim".
    pub service: &'static str,
}

impl HealthResponse {
    /// The only response the endpoint ever emits.
    pub const ONLINE: Self = Self {
        status: "online",
        service: "nominatim",
    };
}

/// Error body returned when forwarding fails.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable failure reason.
    pub error: String,
}

impl ErrorResponse {
    /// Build an error response with the given status.
    pub fn with_status(status: StatusCode, error: impl Into<String>) -> impl IntoResponse {
        (
            status,
            Json(Self {
                error: error.into(),
            }),
        )
    }
}

/// Health check handler - always returns 200.
///
/// Liveness only: the request is never inspected and the base application
/// is never consulted.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::ONLINE))
}

/// Method router for the health path. GET and HEAD answer; anything else
/// gets 405 with an `Allow` header.
pub fn health_handler() -> MethodRouter {
    get(health)
}
