//! Route registration capability and its router-backed implementation.

use axum::{routing::MethodRouter, Router};
use tracing::debug;

use crate::error::RouteError;

/// A request-routing application that accepts additional routes.
///
/// The wrapper only ever needs to add handlers; everything else about the
/// application (its existing routes, fallbacks, state) stays its own.
pub trait BaseApplication {
    /// Bind `handler` to `path`.
    ///
    /// Fails if the path is malformed or already bound. A failed call leaves
    /// the application unchanged.
    fn register_route(&mut self, path: &str, handler: MethodRouter) -> Result<(), RouteError>;

    /// Whether `path` already has a handler.
    fn has_route(&self, path: &str) -> bool;

    /// Finish composition and hand the router to the server.
    fn into_router(self) -> Router
    where
        Self: Sized;
}

/// [`BaseApplication`] backed by an [`axum::Router`].
///
/// Tracks registered paths so duplicates are rejected with an error instead
/// of the panic `Router::route` raises on overlap. Only static paths are
/// accepted: captures and wildcards could overlap under a different
/// spelling, which an exact path comparison cannot detect.
#[derive(Debug, Default)]
pub struct RouteTable {
    router: Router,
    paths: Vec<String>,
}

impl RouteTable {
    /// Create an empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered paths, in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no path is registered.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl BaseApplication for RouteTable {
    fn register_route(&mut self, path: &str, handler: MethodRouter) -> Result<(), RouteError> {
        if !path.starts_with('/') {
            return Err(RouteError::InvalidPath {
                path: path.to_string(),
            });
        }

        if path.contains([':', '*', '{', '}']) {
            return Err(RouteError::DynamicSegment {
                path: path.to_string(),
            });
        }

        if self.has_route(path) {
            return Err(RouteError::Duplicate {
                path: path.to_string(),
            });
        }

        let router = std::mem::take(&mut self.router);
        self.router = router.route(path, handler);
        self.paths.push(path.to_string());

        debug!(path, "Route registered");
        Ok(())
    }

    fn has_route(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    fn into_router(self) -> Router {
        self.router
    }
}
