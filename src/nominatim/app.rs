//! Nominatim base application: every public endpoint forwarded upstream.

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::any,
};
use http_body_util::LengthLimitError;
use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::api::handlers::ErrorResponse;
use crate::api::routes::{BaseApplication, RouteTable};
use crate::config::Config;
use crate::error::Result;

use super::client::NominatimClient;
use super::types::NominatimEndpoint;

/// Largest request body relayed upstream.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Builder for the Nominatim base application.
pub struct NominatimApp;

impl NominatimApp {
    /// Build a route table with every [`NominatimEndpoint`] forwarded to the
    /// upstream configured in `config`.
    pub fn build(config: &Config) -> Result<RouteTable> {
        let client = NominatimClient::new(config)?;
        Self::with_client(client)
    }

    /// Build the route table around an existing client.
    pub fn with_client(client: NominatimClient) -> Result<RouteTable> {
        let mut table = RouteTable::new();
        for endpoint in NominatimEndpoint::iter() {
            table.register_route(endpoint.path(), any(forward).with_state(client.clone()))?;
        }

        debug!(routes = table.len(), upstream = %client.base_url(), "Nominatim routes registered");
        Ok(table)
    }
}

/// Relay the request to the upstream and its answer back, untouched.
async fn forward(State(client): State<NominatimClient>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            let status = if exceeds_limit(&e) {
                StatusCode::PAYLOAD_TOO_LARGE
            } else {
                StatusCode::BAD_REQUEST
            };
            debug!(error = %e, %status, "Rejected request body");
            return ErrorResponse::with_status(status, e.to_string()).into_response();
        }
    };

    let path = parts.uri.path();
    match client
        .forward(parts.method.clone(), path, parts.uri.query(), &parts.headers, body)
        .await
    {
        Ok(response) => response.into_response(),
        Err(e) => {
            warn!(path, error = %e, "Upstream request failed");
            ErrorResponse::with_status(StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

/// Whether a body read failed because it grew past [`MAX_BODY_BYTES`].
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source = Some(err as &(dyn std::error::Error + 'static));
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
