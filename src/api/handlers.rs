//! Route handlers. Each request does exactly one backend read.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, warn};

use super::error::ApiError;
use super::routes::ApiState;
use crate::config::Settings;
use crate::secrets::SecretsClient;

const NO_SECRET: &str = "No secret";

/// Backend paths served by the API.
#[derive(Debug, Clone)]
pub struct SecretPaths {
    fixed: String,
    mount: String,
    environment: String,
}

impl SecretPaths {
    pub fn new<A, B, C>(fixed: A, mount: B, environment: C) -> Self
    where
        A: Into<String>,
        B: Into<String>,
        C: Into<String>,
    {
        Self { fixed: fixed.into(), mount: mount.into(), environment: environment.into() }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.api.fixed_secret_path.as_str(),
            settings.vault.secrets_mount.trim_matches('/'),
            settings.environment.as_str(),
        )
    }

    /// Path for `GET /api/secret`.
    pub fn fixed(&self) -> &str {
        &self.fixed
    }

    /// `{mount}/{service}/{environment}`
    pub fn for_service(&self, service: &str) -> String {
        format!("{}/{}/{}", self.mount, service, self.environment)
    }
}

/// `GET /api/secret`
pub async fn get_fixed_secret(State(state): State<ApiState>) -> Result<Response, ApiError> {
    read_secret(&state.secrets, state.paths.fixed()).await
}

/// `GET /api/secret/{service}`
pub async fn get_service_secret(
    State(state): State<ApiState>,
    Path(service): Path<String>,
) -> Result<Response, ApiError> {
    let path = state.paths.for_service(&service);
    read_secret(&state.secrets, &path).await
}

/// `GET /health`
pub async fn health(State(state): State<ApiState>) -> Response {
    let report = state.health.check_all().await;
    let status = if report.is_up() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    if !report.is_up() {
        warn!(report = ?report.checks, "Health check reported DOWN");
    }
    (status, Json(report)).into_response()
}

async fn read_secret(client: &SecretsClient, path: &str) -> Result<Response, ApiError> {
    match client.get_secret(path).await? {
        Some(secret) if secret.has_data() => Ok(Json(secret).into_response()),
        _ => {
            debug!(path = %path, "Responding with no secret");
            Ok(Json(json!({ "result": NO_SECRET })).into_response())
        }
    }
}
