//! # Error Handling
//!
//! Crate-level error type for vaultgate. Startup failures (configuration,
//! authentication, binding the listener) surface through [`Error`]; per-request
//! backend failures stay as [`SecretsError`] and are mapped to HTTP responses
//! by the API layer.

use crate::secrets::SecretsError;

/// Custom result type for vaultgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vaultgate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network transport errors (listener bind, serve loop)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Secrets backend errors
    #[error(transparent)]
    Secrets(#[from] SecretsError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Self::config(format!("Configuration loading failed: {}", error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = Vec::new();
        collect_validation_messages("", &errors, &mut messages);
        messages.sort();

        Self::config(format!("Validation failed: {}", messages.join("; ")))
    }
}

fn collect_validation_messages(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<String>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path =
            if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let joined = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push(format!("{}: {}", path, joined));
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_validation_messages(&path, nested, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_messages(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}
