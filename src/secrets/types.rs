//! Redacting wrapper for credential material and session tokens.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string that never shows its contents.
///
/// Used for Vault tokens, AppRole secret IDs and service-account JWTs. Debug,
/// Display and Serialize all print `[REDACTED]`; the raw value is reachable only
/// through [`SecretString::expose_secret`]. The buffer is zeroed on drop.
///
/// Deserialization accepts the real value so credentials can be loaded from
/// configuration files and environment variables.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrow the raw value. Only for writing it to the wire.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_redacted_in_formatting() {
        let token = SecretString::new("hvs.CAESIJ-example");
        assert_eq!(format!("{:?}", token), "SecretString([REDACTED])");
        assert_eq!(format!("{}", token), "[REDACTED]");
        assert_eq!(token.expose_secret(), "hvs.CAESIJ-example");
    }

    #[test]
    fn test_serialization_redacts_but_deserialization_reads() {
        let token = SecretString::new("s.rootish");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"[REDACTED]\"");

        let parsed: SecretString = serde_json::from_str("\"s.from-config\"").unwrap();
        assert_eq!(parsed.expose_secret(), "s.from-config");
    }

    #[test]
    fn test_whitespace_only_counts_as_empty() {
        assert!(SecretString::new("  ").is_empty());
        assert!(SecretString::default().is_empty());
        assert!(!SecretString::new("x").is_empty());
    }
}
