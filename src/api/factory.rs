//! Composition of a base application with the health endpoint.

use tracing::info;

use super::handlers::{health_handler, HEALTH_PATH};
use super::routes::{BaseApplication, RouteTable};
use crate::config::Config;
use crate::error::Result;
use crate::error::RouteError;
use crate::nominatim::NominatimApp;

/// Register the health endpoint on `base` and return it.
///
/// Every route `base` already had is left as is. A conflicting `/health`
/// registration is returned unchanged.
pub fn compose<B: BaseApplication>(mut base: B) -> std::result::Result<B, RouteError> {
    base.register_route(HEALTH_PATH, health_handler())?;
    Ok(base)
}

/// Build the Nominatim base application from `config` and compose it.
///
/// Meant to run once at startup; the returned table is the only artifact
/// handed to the server.
pub fn build(config: &Config) -> Result<RouteTable> {
    let base = NominatimApp::build(config)?;
    let app = compose(base)?;

    info!(routes = app.len(), upstream = %config.upstream_url, "Application composed");
    Ok(app)
}
