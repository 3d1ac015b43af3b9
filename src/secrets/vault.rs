//! HashiCorp Vault backend over the HTTP API.
//!
//! Implements [`VaultBackend`] with `reqwest`:
//!
//! - token: `GET /v1/auth/token/lookup-self` validates the configured token
//! - approle / kubernetes: `POST /v1/auth/{mount}/login`
//! - reads: `GET /v1/{path}`
//! - revocation: `POST /v1/auth/token/revoke-self`
//!
//! Every request carries the client-wide timeout. Nothing is retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use vaultgate::secrets::{HttpVaultBackend, VaultBackend};
//!
//! let backend = HttpVaultBackend::new("http://127.0.0.1:8200", Duration::from_secs(10))?;
//! let session = backend.login(&credential).await?;
//! let secret = backend.read(session.token(), "secret-v1/qms-views/dev").await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::backend::VaultBackend;
use super::credential::{Credential, CredentialKind};
use super::envelope::Secret;
use super::error::{Result, SecretsError};
use super::session::Session;
use super::types::SecretString;
use crate::config::VaultSettings;

const TOKEN_HEADER: &str = "X-Vault-Token";

#[derive(Debug, Deserialize)]
struct AuthEnvelope {
    auth: Option<AuthBlock>,
}

#[derive(Debug, Deserialize)]
struct AuthBlock {
    client_token: String,
    #[serde(default)]
    accessor: Option<String>,
    #[serde(default)]
    lease_duration: u64,
    #[serde(default)]
    renewable: bool,
}

#[derive(Debug, Deserialize)]
struct LookupEnvelope {
    data: LookupData,
}

#[derive(Debug, Deserialize)]
struct LookupData {
    #[serde(default)]
    accessor: Option<String>,
    #[serde(default)]
    ttl: u64,
    #[serde(default)]
    renewable: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

/// Vault backend speaking the HTTP API.
#[derive(Debug, Clone)]
pub struct HttpVaultBackend {
    http: Client,
    base_url: Url,
}

impl HttpVaultBackend {
    /// Create a backend for the Vault server at `address`.
    ///
    /// # Errors
    ///
    /// [`SecretsError::ConfigError`] when the address is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(address: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(address).map_err(|e| {
            SecretsError::config_error(format!("Invalid Vault address '{}': {}", address, e))
        })?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(SecretsError::config_error(format!(
                "Vault address '{}' must be an http or https URL",
                address
            )));
        }

        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            SecretsError::config_error(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { http, base_url })
    }

    /// Create a backend from the `vault` section of the settings.
    pub fn from_settings(vault: &VaultSettings) -> Result<Self> {
        Self::new(&vault.address(), vault.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/v1/{path}`, percent-encoding each path segment.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                SecretsError::config_error(format!("Vault address '{}' cannot carry a path", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.push("v1");
            segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        Ok(url)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.request(method, self.endpoint(path)?))
    }

    async fn login_token(&self, token: &SecretString) -> Result<Session> {
        let kind = CredentialKind::Token;
        let response = self
            .request(Method::GET, "auth/token/lookup-self")?
            .header(TOKEN_HEADER, token.expose_secret())
            .send()
            .await
            .map_err(|e| SecretsError::authentication_failed(kind, transport_message(&e)))?;

        if !response.status().is_success() {
            return Err(SecretsError::authentication_failed(kind, error_message(response).await));
        }

        let lookup: LookupEnvelope = response.json().await.map_err(|e| {
            SecretsError::authentication_failed(kind, format!("invalid lookup response: {}", e))
        })?;

        Ok(Session::new(token.clone(), kind, Duration::from_secs(lookup.data.ttl))
            .with_accessor(lookup.data.accessor)
            .with_renewable(lookup.data.renewable))
    }

    async fn login_with(
        &self,
        kind: CredentialKind,
        mount: &str,
        body: serde_json::Value,
    ) -> Result<Session> {
        let response = self
            .request(Method::POST, &format!("auth/{}/login", mount))?
            .json(&body)
            .send()
            .await
            .map_err(|e| SecretsError::authentication_failed(kind, transport_message(&e)))?;

        if !response.status().is_success() {
            return Err(SecretsError::authentication_failed(kind, error_message(response).await));
        }

        let envelope: AuthEnvelope = response.json().await.map_err(|e| {
            SecretsError::authentication_failed(kind, format!("invalid login response: {}", e))
        })?;

        let auth = envelope
            .auth
            .filter(|auth| !auth.client_token.is_empty())
            .ok_or_else(|| {
                SecretsError::authentication_failed(kind, "login response carried no client token")
            })?;

        Ok(Session::new(
            SecretString::new(auth.client_token),
            kind,
            Duration::from_secs(auth.lease_duration),
        )
        .with_accessor(auth.accessor)
        .with_renewable(auth.renewable))
    }
}

#[async_trait]
impl VaultBackend for HttpVaultBackend {
    async fn login(&self, credential: &Credential) -> Result<Session> {
        match credential {
            Credential::Token { token } => self.login_token(token).await,
            Credential::AppRole { mount, role_id, secret_id } => {
                let body = json!({
                    "role_id": role_id,
                    "secret_id": secret_id.expose_secret(),
                });
                self.login_with(CredentialKind::AppRole, mount, body).await
            }
            Credential::Kubernetes { mount, role, jwt_path } => {
                let kind = CredentialKind::Kubernetes;
                let jwt = tokio::fs::read_to_string(jwt_path).await.map_err(|e| {
                    SecretsError::authentication_failed(
                        kind,
                        format!(
                            "cannot read service account token '{}': {}",
                            jwt_path.display(),
                            e
                        ),
                    )
                })?;
                let jwt = SecretString::new(jwt.trim());
                let body = json!({ "role": role, "jwt": jwt.expose_secret() });
                self.login_with(kind, mount, body).await
            }
        }
    }

    async fn read(&self, token: &SecretString, path: &str) -> Result<Option<Secret>> {
        let response = self
            .request(Method::GET, path)?
            .header(TOKEN_HEADER, token.expose_secret())
            .send()
            .await
            .map_err(|e| SecretsError::unavailable(transport_message(&e)))?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => return Ok(None),
            StatusCode::FORBIDDEN => {
                return Err(SecretsError::permission_denied(error_message(response).await));
            }
            s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
                return Err(SecretsError::unavailable(error_message(response).await));
            }
            s if !s.is_success() => {
                return Err(SecretsError::backend_error(error_message(response).await));
            }
            _ => {}
        }

        let body = response.text().await.map_err(|e| SecretsError::unavailable(transport_message(&e)))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let secret: Secret = serde_json::from_str(&body)
            .map_err(|e| SecretsError::malformed(format!("invalid secret response: {}", e)))?;

        Ok(Some(secret).filter(Secret::has_data))
    }

    async fn revoke_self(&self, token: &SecretString) -> Result<()> {
        let response = self
            .request(Method::POST, "auth/token/revoke-self")?
            .header(TOKEN_HEADER, token.expose_secret())
            .send()
            .await
            .map_err(|e| SecretsError::unavailable(transport_message(&e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SecretsError::backend_error(error_message(response).await))
        }
    }
}

/// The innermost cause of a transport error ("connection refused", ...).
fn transport_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return "request to Vault timed out".to_string();
    }

    let mut source: &dyn std::error::Error = error;
    while let Some(next) = source.source() {
        source = next;
    }
    source.to_string()
}

/// Vault reports failures as `{"errors": [...]}`; fall back to the status line.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed.errors.join("; "),
        _ if body.trim().is_empty() => status.to_string(),
        _ => format!("{}: {}", status, body.trim()),
    }
}
