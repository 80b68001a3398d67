//! Unified error types for the Nominatim wrapper.

use thiserror::Error;

/// Unified error type for the wrapper.
#[derive(Error, Debug)]
pub enum WrapperError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Route registration error.
    #[error("route error: {0}")]
    Route(#[from] RouteError),

    /// Upstream Nominatim error.
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Metrics recorder could not be installed.
    #[error("metrics error: {0}")]
    Metrics(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while registering routes on a base application.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The path already has a handler.
    #[error("route {path} is already registered")]
    Duplicate {
        /// The conflicting path.
        path: String,
    },

    /// The path is empty or does not start with `/`.
    #[error("invalid route path {path:?}: must start with '/'")]
    InvalidPath {
        /// The rejected path.
        path: String,
    },

    /// The path contains a capture or wildcard segment; only static paths
    /// can be checked for overlap.
    #[error("route {path} is not a static path")]
    DynamicSegment {
        /// The rejected path.
        path: String,
    },
}

/// Errors talking to the upstream Nominatim server.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The configured upstream URL could not be parsed.
    #[error("invalid upstream url {url}: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// Upstream answered with a non-success status where one was required.
    #[error("upstream returned {status} for {path}")]
    BadStatus {
        /// Requested path.
        path: String,
        /// Returned HTTP status.
        status: u16,
    },

    /// HTTP request failed (connect, timeout, body read).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias using [`WrapperError`].
pub type Result<T> = std::result::Result<T, WrapperError>;
