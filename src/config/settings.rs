//! # Configuration Settings
//!
//! Typed settings for vaultgate. Values are layered in this order, later
//! layers winning:
//!
//! 1. built-in defaults
//! 2. the optional config file (yaml, toml or json)
//! 3. `VAULTGATE__*` environment variables (`__` separates nesting levels,
//!    e.g. `VAULTGATE__VAULT__CREDENTIAL__ROLE_ID`)
//! 4. `ENV` for the environment name

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::Result;
use crate::secrets::SecretString;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "VAULTGATE";

/// Variable holding the environment name used in per-service secret paths.
pub const ENVIRONMENT_VAR: &str = "ENV";

/// Environment name used when `ENV` is unset or blank.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Config file base name looked up when no path is given.
pub const DEFAULT_CONFIG_NAME: &str = "config";

/// Main application settings. Loaded once at startup, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Environment name (`dev`, `qa`, `prod`, ...)
    #[validate(length(min = 1, message = "Environment cannot be empty"))]
    pub environment: String,

    #[validate(nested)]
    pub server: ServerSettings,

    #[validate(nested)]
    pub vault: VaultSettings,

    #[validate(nested)]
    pub api: ApiSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            server: ServerSettings::default(),
            vault: VaultSettings::default(),
            api: ApiSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the config file, the process environment and `ENV`.
    ///
    /// With `config_file = None` a `config.{yaml,toml,json}` in the working
    /// directory is used if present. An explicitly named file must exist.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::load_from(config_file, std::env::vars().collect())
    }

    /// Load settings using `vars` instead of the process environment.
    pub fn load_from(config_file: Option<&Path>, vars: HashMap<String, String>) -> Result<Self> {
        let defaults = Settings::default();

        let file_source = match config_file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let environment = vars
            .get(ENVIRONMENT_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let builder = config::Config::builder()
            .set_default("environment", defaults.environment)?
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("server.shutdown_grace_seconds", defaults.server.shutdown_grace_seconds)?
            .set_default("vault.host", defaults.vault.host)?
            .set_default("vault.port", i64::from(defaults.vault.port))?
            .set_default("vault.scheme", defaults.vault.scheme)?
            .set_default("vault.secrets_mount", defaults.vault.secrets_mount)?
            .set_default("vault.timeout_seconds", defaults.vault.timeout_seconds)?
            .set_default("api.fixed_secret_path", defaults.api.fixed_secret_path)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", "pretty")?
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(Some(vars)),
            )
            .set_override_option("environment", environment)?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate field presence and ranges.
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self)?;
        Ok(())
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerSettings {
    /// Bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Bind port (0 picks an ephemeral port)
    pub port: u16,

    /// How long in-flight requests may run after a shutdown signal
    #[validate(range(max = 300, message = "Shutdown grace must be at most 300 seconds"))]
    pub shutdown_grace_seconds: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080, shutdown_grace_seconds: 10 }
    }
}

impl ServerSettings {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}

/// Secrets backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VaultSettings {
    #[validate(length(min = 1, message = "Vault host cannot be empty"))]
    pub host: String,

    #[validate(range(min = 1, message = "Vault port must be between 1 and 65535"))]
    pub port: u16,

    #[validate(custom(function = "validate_scheme"))]
    pub scheme: String,

    /// Auth method (`token`, `approle`, `kubernetes`); inferred when unset
    #[serde(default)]
    pub authentication: Option<String>,

    /// Auth role (Kubernetes login)
    #[serde(default)]
    pub role: Option<String>,

    /// Auth method mount; defaults to the method name
    #[serde(default)]
    pub auth_mount: Option<String>,

    /// Prefix of the per-service paths read by `GET /api/secret/{service}`.
    /// Not passed to any auth method; see `auth_mount` for that.
    #[validate(length(min = 1, message = "Secrets mount cannot be empty"))]
    pub secrets_mount: String,

    /// Per-request timeout for backend calls
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub credential: CredentialSettings,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8200,
            scheme: "http".to_string(),
            authentication: None,
            role: None,
            auth_mount: None,
            secrets_mount: "secret-v1".to_string(),
            timeout_seconds: 10,
            credential: CredentialSettings::default(),
        }
    }
}

impl VaultSettings {
    /// `{scheme}://{host}:{port}`
    pub fn address(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// The backend's own health endpoint, standby nodes counted as healthy.
    pub fn health_url(&self) -> String {
        format!("{}/v1/sys/health?perfstandbyok=true", self.address())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Raw credential fields. Exactly one form should be populated; see
/// [`Credential::from_settings`](crate::secrets::Credential::from_settings).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialSettings {
    #[serde(default)]
    pub token: Option<SecretString>,

    #[serde(default)]
    pub role_id: Option<String>,

    #[serde(default)]
    pub secret_id: Option<SecretString>,

    /// Path to a Kubernetes service-account JWT
    #[serde(default)]
    pub service_account: Option<String>,
}

/// HTTP API settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiSettings {
    /// Path read by `GET /api/secret`, independent of the environment name
    #[validate(length(min = 1, message = "Fixed secret path cannot be empty"))]
    pub fixed_secret_path: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self { fixed_secret_path: "secret-v1/qms-views/dev".to_string() }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Pretty }
    }
}

fn validate_scheme(scheme: &str) -> std::result::Result<(), ValidationError> {
    match scheme {
        "http" | "https" => Ok(()),
        _ => {
            let mut error = ValidationError::new("scheme");
            error.message = Some("Vault scheme must be http or https".into());
            Err(error)
        }
    }
}
