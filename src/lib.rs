//! # vaultgate
//!
//! A small HTTP gateway that exposes secrets held in a HashiCorp Vault
//! compatible backend as JSON. It authenticates once at startup (static token,
//! AppRole or Kubernetes service account), serves reads on behalf of callers,
//! reports its own and the backend's health, and revokes its session token on
//! shutdown.
//!
//! ## Architecture
//!
//! ```text
//! HTTP client → axum router → SecretsClient → VaultBackend (HTTP) → Vault
//!                    ↓
//!              HealthChecker → Vault sys/health
//! ```
//!
//! ## Routes
//!
//! - `GET /api/secret`: secret at the configured fixed path
//! - `GET /api/secret/{service}`: secret at `{mount}/{service}/{environment}`
//! - `GET /health`: aggregate health, 200 when UP and 503 when DOWN
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use vaultgate::{config::Settings, lifecycle::{shutdown_signal, Lifecycle}, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = Settings::load(None)?;
//!     let mut lifecycle = Lifecycle::from_settings(settings)?;
//!     lifecycle.run(shutdown_signal()).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod observability;
pub mod secrets;

pub use config::Settings;
pub use errors::{Error, Result};
pub use lifecycle::{Lifecycle, Phase};
pub use secrets::{SecretsClient, SecretsError};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
