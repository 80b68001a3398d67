//! Application configuration loaded from environment variables.

use std::net::{IpAddr, Ipv4Addr};

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Upstream ===
    /// Base URL of the Nominatim server requests are forwarded to.
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Upstream request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// Idle upstream connections kept per host.
    #[serde(default = "default_http_pool_size")]
    pub http_pool_size: usize,

    // === Server Configuration ===
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Attach a permissive CORS layer.
    #[serde(default)]
    pub enable_cors: bool,

    /// Expose Prometheus metrics on `/metrics`.
    #[serde(default = "default_true")]
    pub enable_metrics: bool,
}

fn default_upstream_url() -> String {
    "http://127.0.0.1:8088".to_string()
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_http_pool_size() -> usize {
    16
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_url: default_upstream_url(),
            http_timeout_ms: default_http_timeout_ms(),
            http_pool_size: default_http_pool_size(),
            bind_address: default_bind_address(),
            port: default_port(),
            enable_cors: false,
            enable_metrics: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.upstream_url)
            .map_err(|e| format!("UPSTREAM_URL is not a valid URL: {}", e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err("UPSTREAM_URL must use http or https".to_string());
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        if self.http_pool_size == 0 {
            return Err("HTTP_POOL_SIZE must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Socket address the server listens on.
    pub fn listen_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.bind_address, self.port)
    }
}
