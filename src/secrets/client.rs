//! Session-owning secrets client.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::backend::VaultBackend;
use super::credential::{Credential, CredentialKind};
use super::envelope::Secret;
use super::error::{Result, SecretsError};
use super::session::Session;
use super::vault::HttpVaultBackend;
use crate::config::VaultSettings;

#[derive(Debug)]
enum SessionState {
    Uninitialized,
    Active(Session),
    Closed,
}

/// Wraps a [`VaultBackend`] and owns the single session of the process.
///
/// Lifecycle: [`initialize`](Self::initialize) once before serving traffic,
/// [`get_secret`](Self::get_secret) from any number of request tasks, then
/// [`close`](Self::close) at shutdown.
///
/// Reads hold a shared guard on the session for the whole backend call and
/// `close` takes the exclusive guard, so revocation waits for in-flight reads
/// and no read is ever issued with a revoked token.
pub struct SecretsClient {
    backend: Arc<dyn VaultBackend>,
    credential: Credential,
    state: RwLock<SessionState>,
}

impl SecretsClient {
    pub fn new(backend: Arc<dyn VaultBackend>, credential: Credential) -> Self {
        Self { backend, credential, state: RwLock::new(SessionState::Uninitialized) }
    }

    /// Build an HTTP-backed client from the `vault` settings section.
    ///
    /// # Errors
    ///
    /// Credential resolution or address errors; no network call is made.
    pub fn from_settings(vault: &VaultSettings) -> Result<Self> {
        let credential = Credential::from_settings(vault)?;
        let backend = HttpVaultBackend::from_settings(vault)?;
        Ok(Self::new(Arc::new(backend), credential))
    }

    pub fn credential_kind(&self) -> CredentialKind {
        self.credential.kind()
    }

    /// Log in with the configured credential and keep the session.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::AuthenticationFailed`] naming the credential form
    /// - [`SecretsError::AlreadyInitialized`] if a session is already held
    /// - [`SecretsError::Closed`] after [`close`](Self::close)
    pub async fn initialize(&self) -> Result<()> {
        let mut state = self.state.write().await;
        match *state {
            SessionState::Active(_) => return Err(SecretsError::AlreadyInitialized),
            SessionState::Closed => return Err(SecretsError::Closed),
            SessionState::Uninitialized => {}
        }

        let method = self.credential.kind();
        info!(method = %method, "Authenticating with Vault");

        let session = self.backend.login(&self.credential).await?;
        info!(
            method = %method,
            accessor = session.accessor().unwrap_or("-"),
            ttl_secs = session.lease_duration().as_secs(),
            renewable = session.renewable(),
            expires_at = ?session.expires_at(),
            "Vault session established"
        );

        *state = SessionState::Active(session);
        Ok(())
    }

    /// Read the secret at `path` with the current session.
    ///
    /// `Ok(None)` means the backend holds no data at `path`.
    pub async fn get_secret(&self, path: &str) -> Result<Option<Secret>> {
        let state = self.state.read().await;
        let session = match &*state {
            SessionState::Active(session) => session,
            SessionState::Uninitialized => return Err(SecretsError::NotInitialized),
            SessionState::Closed => return Err(SecretsError::Closed),
        };

        match self.backend.read(session.token(), path).await {
            Ok(Some(secret)) => {
                debug!(path = %path, lease_duration = secret.lease_duration, "Read secret from Vault");
                Ok(Some(secret))
            }
            Ok(None) => {
                debug!(path = %path, "No secret at path");
                Ok(None)
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to read secret from Vault");
                Err(e)
            }
        }
    }

    /// Revoke the session token. Best-effort and idempotent: failures are
    /// logged, later calls do nothing.
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        let previous = std::mem::replace(&mut *state, SessionState::Closed);

        match previous {
            SessionState::Active(session) => {
                match self.backend.revoke_self(session.token()).await {
                    Ok(()) => info!(method = %session.method(), "Vault token revoked"),
                    Err(e) => warn!(
                        method = %session.method(),
                        error = %e,
                        "Failed to revoke Vault token, continuing shutdown"
                    ),
                }
            }
            SessionState::Uninitialized => debug!("Secrets client closed before initialization"),
            SessionState::Closed => debug!("Secrets client already closed"),
        }
    }

    /// True while a session is held.
    pub async fn is_active(&self) -> bool {
        matches!(*self.state.read().await, SessionState::Active(_))
    }
}

impl std::fmt::Debug for SecretsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsClient").field("method", &self.credential.kind()).finish()
    }
}
