//! Credential forms accepted by the secrets backend.
//!
//! A deployment authenticates with exactly one of: a static token, an AppRole
//! role-id/secret-id pair, or a Kubernetes service-account JWT. The form is
//! either named explicitly by `vault.authentication` or inferred from which
//! credential fields are populated.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{Result, SecretsError};
use super::types::SecretString;
use crate::config::VaultSettings;

/// Which credential form a session was obtained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Token,
    AppRole,
    Kubernetes,
}

impl CredentialKind {
    /// Auth method mount used when `vault.auth_mount` is not set.
    pub fn default_mount(&self) -> &'static str {
        match self {
            CredentialKind::Token => "token",
            CredentialKind::AppRole => "approle",
            CredentialKind::Kubernetes => "kubernetes",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_mount())
    }
}

impl FromStr for CredentialKind {
    type Err = SecretsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" => Ok(CredentialKind::Token),
            "approle" => Ok(CredentialKind::AppRole),
            "kubernetes" | "k8s" => Ok(CredentialKind::Kubernetes),
            other => Err(SecretsError::invalid_credential(format!(
                "unknown authentication method '{}' (expected token, approle or kubernetes)",
                other
            ))),
        }
    }
}

/// Resolved authentication material.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    /// A pre-issued Vault token.
    Token { token: SecretString },

    /// AppRole login against `auth/{mount}/login`.
    AppRole { mount: String, role_id: String, secret_id: SecretString },

    /// Kubernetes login against `auth/{mount}/login`; the JWT is read from
    /// `jwt_path` at login time.
    Kubernetes { mount: String, role: String, jwt_path: PathBuf },
}

impl Credential {
    pub fn kind(&self) -> CredentialKind {
        match self {
            Credential::Token { .. } => CredentialKind::Token,
            Credential::AppRole { .. } => CredentialKind::AppRole,
            Credential::Kubernetes { .. } => CredentialKind::Kubernetes,
        }
    }

    /// Resolve the credential from vault settings.
    ///
    /// # Errors
    ///
    /// [`SecretsError::InvalidCredential`] when no form, more than one form, or
    /// an incomplete form is configured.
    pub fn from_settings(vault: &VaultSettings) -> Result<Self> {
        let explicit = vault
            .authentication
            .as_deref()
            .map(str::trim)
            .filter(|method| !method.is_empty());

        let kind = match explicit {
            Some(method) => method.parse()?,
            None => infer_kind(vault)?,
        };

        let mount = vault
            .auth_mount
            .as_deref()
            .map(|m| m.trim().trim_matches('/'))
            .filter(|m| !m.is_empty())
            .unwrap_or(kind.default_mount())
            .to_string();

        let creds = &vault.credential;
        match kind {
            CredentialKind::Token => {
                let token = present_secret(creds.token.as_ref())
                    .ok_or_else(|| missing(kind, "vault.credential.token"))?;
                Ok(Credential::Token { token: token.clone() })
            }
            CredentialKind::AppRole => {
                let role_id = present(creds.role_id.as_deref())
                    .ok_or_else(|| missing(kind, "vault.credential.role_id"))?;
                let secret_id = present_secret(creds.secret_id.as_ref())
                    .ok_or_else(|| missing(kind, "vault.credential.secret_id"))?;
                Ok(Credential::AppRole {
                    mount,
                    role_id: role_id.to_string(),
                    secret_id: secret_id.clone(),
                })
            }
            CredentialKind::Kubernetes => {
                let jwt_path = present(creds.service_account.as_deref())
                    .ok_or_else(|| missing(kind, "vault.credential.service_account"))?;
                let role =
                    present(vault.role.as_deref()).ok_or_else(|| missing(kind, "vault.role"))?;
                Ok(Credential::Kubernetes {
                    mount,
                    role: role.to_string(),
                    jwt_path: PathBuf::from(jwt_path),
                })
            }
        }
    }
}

fn infer_kind(vault: &VaultSettings) -> Result<CredentialKind> {
    let creds = &vault.credential;
    let mut populated = Vec::new();

    if present_secret(creds.token.as_ref()).is_some() {
        populated.push(CredentialKind::Token);
    }
    if present(creds.role_id.as_deref()).is_some() || present_secret(creds.secret_id.as_ref()).is_some()
    {
        populated.push(CredentialKind::AppRole);
    }
    if present(creds.service_account.as_deref()).is_some() {
        populated.push(CredentialKind::Kubernetes);
    }

    match populated.as_slice() {
        [kind] => Ok(*kind),
        [] => Err(SecretsError::invalid_credential(
            "no credential configured: set a token, a role_id/secret_id pair or a service_account",
        )),
        many => Err(SecretsError::invalid_credential(format!(
            "ambiguous credential configuration ({}); set vault.authentication to choose one",
            many.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        ))),
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn present_secret(value: Option<&SecretString>) -> Option<&SecretString> {
    value.filter(|v| !v.is_empty())
}

fn missing(kind: CredentialKind, field: &str) -> SecretsError {
    SecretsError::invalid_credential(format!("{} authentication requires {}", kind, field))
}
