//! # Configuration Management
//!
//! Layered configuration for vaultgate: defaults, an optional config file,
//! `VAULTGATE__*` environment overrides and the `ENV` environment name.

pub mod settings;

pub use settings::{
    ApiSettings, CredentialSettings, LogFormat, LoggingSettings, ServerSettings, Settings,
    VaultSettings, DEFAULT_ENVIRONMENT, ENVIRONMENT_VAR, ENV_PREFIX,
};
