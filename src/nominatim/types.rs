//! Types describing the upstream Nominatim API.

use axum::{
    body::Bytes,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Public Nominatim endpoints the base application answers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum NominatimEndpoint {
    /// Landing page.
    #[strum(serialize = "/")]
    Root,
    /// Forward geocoding.
    #[strum(serialize = "/search")]
    Search,
    /// Reverse geocoding.
    #[strum(serialize = "/reverse")]
    Reverse,
    /// OSM id lookup.
    #[strum(serialize = "/lookup")]
    Lookup,
    /// Server and database status.
    #[strum(serialize = "/status")]
    Status,
    /// Place details.
    #[strum(serialize = "/details")]
    Details,
    /// Places scheduled for deletion.
    #[strum(serialize = "/deletable")]
    Deletable,
    /// Broken polygons.
    #[strum(serialize = "/polygons")]
    Polygons,
}

impl NominatimEndpoint {
    /// Route path for this endpoint.
    pub fn path(&self) -> &'static str {
        (*self).into()
    }
}

/// `/status?format=json` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    /// 0 when healthy.
    pub status: i32,
    /// "OK" or a failure description.
    pub message: String,
    /// Timestamp of the last data import.
    #[serde(default)]
    pub data_updated: Option<String>,
    /// Nominatim software version.
    #[serde(default)]
    pub software_version: Option<String>,
    /// Database schema version.
    #[serde(default)]
    pub database_version: Option<String>,
}

impl StatusResponse {
    /// Whether Nominatim reports itself operational.
    pub fn is_ok(&self) -> bool {
        self.status == 0
    }
}

/// Response received from the upstream, relayed as-is.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// Upstream status code.
    pub status: StatusCode,
    /// End-to-end response headers.
    pub headers: HeaderMap,
    /// Full response body.
    pub body: Bytes,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// Headers that describe a single connection rather than the message.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// Copy `headers` without hop-by-hop entries or a stale content length.
///
/// Headers listed in `Connection` are connection-scoped as well and are
/// dropped with the fixed set.
pub fn end_to_end_headers(headers: &HeaderMap) -> HeaderMap {
    let listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect();

    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name_str = name.as_str();
        if HOP_BY_HOP.contains(&name_str) || listed.iter().any(|t| t == name_str) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Point a `Location` into the upstream back at the wrapper.
///
/// `http://upstream/nominatim/search?q=x` with base
/// `http://upstream/nominatim` becomes `/search?q=x`. Locations outside
/// the base are left as they are.
pub fn rewrite_location(headers: &mut HeaderMap, base_url: &str) {
    let Some(location) = headers.get(header::LOCATION).and_then(|v| v.to_str().ok()) else {
        return;
    };
    let Some(rest) = location.strip_prefix(base_url) else {
        return;
    };

    let relative = match rest.chars().next() {
        None => "/".to_string(),
        Some('/') => rest.to_string(),
        Some('?') => format!("/{}", rest),
        // Same prefix, different host or path segment.
        Some(_) => return,
    };

    if let Ok(value) = HeaderValue::from_str(&relative) {
        headers.insert(header::LOCATION, value);
    }
}
