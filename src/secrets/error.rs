//! Error types for secrets backend operations.

use thiserror::Error;

use super::credential::CredentialKind;

/// Result type for secrets operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors that can occur while talking to the secrets backend.
///
/// Per-request variants (`Unavailable`, `PermissionDenied`, `Backend`,
/// `MalformedResponse`) display the backend's message verbatim; the HTTP layer
/// forwards that text to the caller unchanged.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// Login with the configured credential was rejected or could not complete.
    #[error("Authentication with {method} credential failed: {message}")]
    AuthenticationFailed { method: CredentialKind, message: String },

    /// The credential configuration is missing, ambiguous or unreadable.
    #[error("Invalid credential configuration: {message}")]
    InvalidCredential { message: String },

    /// The backend could not be reached (connect error, timeout, 5xx).
    #[error("{message}")]
    Unavailable { message: String },

    /// The session token is not allowed to read the path.
    #[error("{message}")]
    PermissionDenied { message: String },

    /// Any other non-success answer from the backend.
    #[error("{message}")]
    Backend { message: String },

    /// The backend answered with a body that is not a valid envelope.
    #[error("{message}")]
    MalformedResponse { message: String },

    /// `get_secret` was called before `initialize`.
    #[error("Secrets client is not initialized")]
    NotInitialized,

    /// `initialize` was called while a session is already held.
    #[error("Secrets client is already initialized")]
    AlreadyInitialized,

    /// The client was closed and its session revoked.
    #[error("Secrets client is closed")]
    Closed,

    /// Configuration error detected while building the client.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl SecretsError {
    /// Create an authentication failed error.
    pub fn authentication_failed(method: CredentialKind, message: impl Into<String>) -> Self {
        Self::AuthenticationFailed { method, message: message.into() }
    }

    /// Create an invalid credential error.
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::InvalidCredential { message: message.into() }
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into() }
    }

    /// Create a permission denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied { message: message.into() }
    }

    /// Create a backend error.
    pub fn backend_error(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }

    /// Create a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse { message: message.into() }
    }

    /// Create a config error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into() }
    }

    /// The credential form involved in an authentication failure, if any.
    pub fn credential_kind(&self) -> Option<CredentialKind> {
        match self {
            Self::AuthenticationFailed { method, .. } => Some(*method),
            _ => None,
        }
    }
}
