use std::sync::Arc;

use axum::{body::Body, http::Request, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{get_fixed_secret, get_service_secret, health, SecretPaths};
use crate::observability::HealthChecker;
use crate::secrets::SecretsClient;

#[derive(Clone)]
pub struct ApiState {
    pub secrets: Arc<SecretsClient>,
    pub health: HealthChecker,
    pub paths: Arc<SecretPaths>,
}

impl ApiState {
    pub fn new(secrets: Arc<SecretsClient>, health: HealthChecker, paths: SecretPaths) -> Self {
        Self { secrets, health, paths: Arc::new(paths) }
    }
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/secret", get(get_fixed_secret))
        .route("/api/secret/{service}", get(get_service_secret))
        .route("/health", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                crate::request_span!(request.method(), request.uri().path())
            }),
        )
}
