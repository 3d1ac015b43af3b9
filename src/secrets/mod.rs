//! Secrets backend access.
//!
//! This module owns everything that talks to the Vault-compatible secret store:
//!
//! - [`Credential`]: the single credential form configured for the deployment
//!   (static token, AppRole pair or Kubernetes service account)
//! - [`VaultBackend`]: one-round-trip protocol operations (login, read, revoke)
//! - [`HttpVaultBackend`]: the HTTP API implementation of that trait
//! - [`SecretsClient`]: owns the process-wide [`Session`] and exposes
//!   `initialize`, `get_secret` and `close`
//!
//! # Example
//!
//! ```rust,ignore
//! use vaultgate::secrets::SecretsClient;
//!
//! let client = SecretsClient::from_settings(&settings.vault)?;
//! client.initialize().await?;
//!
//! match client.get_secret("secret-v1/qms-views/dev").await? {
//!     Some(secret) => println!("{} keys", secret.data.map_or(0, |d| d.len())),
//!     None => println!("No secret"),
//! }
//!
//! client.close().await;
//! ```
//!
//! # Security Considerations
//!
//! - Tokens, secret IDs and JWTs are held in [`SecretString`] and never logged
//! - There is no caching: every read is a live backend call
//! - Error text from the backend is passed through to HTTP callers

pub mod backend;
pub mod client;
pub mod credential;
pub mod envelope;
pub mod error;
pub mod session;
pub mod types;
pub mod vault;

#[cfg(test)]
pub(crate) mod test_utils;

pub use backend::VaultBackend;
pub use client::SecretsClient;
pub use credential::{Credential, CredentialKind};
pub use envelope::Secret;
pub use error::{Result, SecretsError};
pub use session::Session;
pub use types::SecretString;
pub use vault::HttpVaultBackend;
