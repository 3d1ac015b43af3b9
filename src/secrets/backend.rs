//! Backend protocol seam.

use async_trait::async_trait;

use super::credential::Credential;
use super::envelope::Secret;
use super::error::Result;
use super::session::Session;
use super::types::SecretString;

/// Operations the secrets client needs from a Vault-compatible backend.
///
/// Each call is a single round trip. Implementations do not retry, cache or
/// hold tokens; the [`SecretsClient`](super::SecretsClient) owns the session
/// and passes the token in.
///
/// Implementations MUST NOT log token or secret values.
#[async_trait]
pub trait VaultBackend: Send + Sync {
    /// Authenticate with `credential` and return the resulting session.
    ///
    /// # Errors
    ///
    /// [`SecretsError::AuthenticationFailed`](super::SecretsError::AuthenticationFailed)
    /// naming the credential form on any failure.
    async fn login(&self, credential: &Credential) -> Result<Session>;

    /// Read the secret at `path`.
    ///
    /// Returns `Ok(None)` when the backend holds no data at `path`; that is a
    /// normal outcome, not an error.
    async fn read(&self, token: &SecretString, path: &str) -> Result<Option<Secret>>;

    /// Revoke `token` so it can no longer be used.
    async fn revoke_self(&self, token: &SecretString) -> Result<()>;
}
