//! # Structured Logging
//!
//! Subscriber setup and span helpers built on the tracing ecosystem.
//!
//! `RUST_LOG` wins over the configured level when set. JSON output emits one
//! object per event with span fields (including `request_id`) attached.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingSettings, Settings};
use crate::errors::{Error, Result};

/// Create a tracing span for request tracking.
///
/// ```rust,ignore
/// let span = request_span!("GET", "/api/secret/foo");
/// let span = request_span!("GET", "/api/secret/foo", service = "foo");
/// ```
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($method:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Build the event filter: `RUST_LOG` if set and parseable, else `level`.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| Error::config(format!("Invalid log level '{}': {}", level, e))),
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(settings: &LoggingSettings) -> Result<()> {
    let filter = env_filter(&settings.level)?;

    let installed = match settings.format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_env_filter(filter)
                .finish(),
        ),
        LogFormat::Pretty => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt().with_target(true).with_env_filter(filter).finish(),
        ),
    };

    installed.map_err(|e| Error::internal(format!("Failed to install log subscriber: {}", e)))
}

/// Log configuration at startup. Credentials are never logged.
pub fn log_config_info(settings: &Settings) {
    tracing::info!(
        environment = %settings.environment,
        server_address = %settings.server.bind_address(),
        vault_address = %settings.vault.address(),
        secrets_mount = %settings.vault.secrets_mount,
        fixed_secret_path = %settings.api.fixed_secret_path,
        timeout_secs = settings.vault.timeout_seconds,
        "vaultgate configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = request_span!("GET", "/api/secret");
        let _span = request_span!("GET", "/api/secret/foo", service = "foo");
    }

    #[test]
    fn test_invalid_level_is_config_error() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = env_filter("vaultgate=loud").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_log_config_info_does_not_panic() {
        log_config_info(&Settings::default());
    }
}
