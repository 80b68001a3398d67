//! HTTP surface: the health endpoint, the route registration capability and
//! the factory that composes them.

pub mod factory;
pub mod handlers;
pub mod routes;

pub use factory::{build, compose};
pub use handlers::{health, HealthResponse, HEALTH_PATH};
pub use routes::{BaseApplication, RouteTable};
