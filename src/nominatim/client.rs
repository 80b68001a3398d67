//! HTTP client for the upstream Nominatim server.

use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::error::UpstreamError;
use crate::metrics;

use super::types::{end_to_end_headers, rewrite_location, StatusResponse, UpstreamResponse};

/// Upstream Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    /// HTTP client for upstream requests.
    http: reqwest::Client,
    /// Upstream base URL, without a trailing slash.
    base_url: String,
}

impl NominatimClient {
    /// Create a client from config with pooled, keep-alive connections.
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let parsed = Url::parse(&config.upstream_url).map_err(|e| UpstreamError::InvalidUrl {
            url: config.upstream_url.clone(),
            reason: e.to_string(),
        })?;

        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(UpstreamError::InvalidUrl {
                url: config.upstream_url.clone(),
                reason: "expected an http(s) base URL".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(Duration::from_secs(2))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(config.http_pool_size)
            .pool_idle_timeout(Duration::from_secs(90))
            // Redirects are relayed to the caller, not followed.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Upstream base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full upstream URL for `path` and an optional raw query string.
    pub fn url_for(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}{}?{}", self.base_url, path, q),
            _ => format!("{}{}", self.base_url, path),
        }
    }

    /// Forward one request and collect the full upstream response.
    #[instrument(skip(self, headers, body), fields(upstream = %self.base_url))]
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = self.url_for(path, query);
        let start = Instant::now();
        metrics::inc_upstream_requests(path);

        let result = self.send(method, &url, headers, body).await;
        metrics::record_upstream_latency(start, path);

        match result {
            Ok(response) => {
                debug!(status = %response.status, bytes = response.body.len(), "Upstream responded");
                Ok(response)
            }
            Err(e) => {
                metrics::inc_upstream_failures(path);
                Err(e)
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let mut request = self
            .http
            .request(method, url)
            .headers(end_to_end_headers(headers));
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let mut headers = end_to_end_headers(response.headers());
        rewrite_location(&mut headers, &self.base_url);
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }

    /// Query the upstream `/status` endpoint.
    #[instrument(skip(self))]
    pub async fn status(&self) -> Result<StatusResponse, UpstreamError> {
        let url = self.url_for("/status", Some("format=json"));
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(UpstreamError::BadStatus {
                path: "/status".to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}
