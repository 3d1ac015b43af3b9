//! # REST API
//!
//! HTTP surface of the gateway: two secret-read routes and a health route.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use handlers::SecretPaths;
pub use routes::{build_router, ApiState};
pub use server::{bind_listener, serve};
