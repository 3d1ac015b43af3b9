//! Authenticated session held by the secrets client.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::credential::CredentialKind;
use super::types::SecretString;

/// The token obtained after login together with its lease information.
///
/// A `lease_duration` of zero means the token does not expire (root or
/// periodic tokens looked up with a zero TTL).
#[derive(Debug, Clone)]
pub struct Session {
    token: SecretString,
    accessor: Option<String>,
    lease_duration: Duration,
    renewable: bool,
    method: CredentialKind,
    issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: SecretString, method: CredentialKind, lease_duration: Duration) -> Self {
        Self {
            token,
            accessor: None,
            lease_duration,
            renewable: false,
            method,
            issued_at: Utc::now(),
        }
    }

    pub fn with_accessor(mut self, accessor: Option<String>) -> Self {
        self.accessor = accessor.filter(|a| !a.is_empty());
        self
    }

    pub fn with_renewable(mut self, renewable: bool) -> Self {
        self.renewable = renewable;
        self
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn accessor(&self) -> Option<&str> {
        self.accessor.as_deref()
    }

    pub fn lease_duration(&self) -> Duration {
        self.lease_duration
    }

    pub fn renewable(&self) -> bool {
        self.renewable
    }

    pub fn method(&self) -> CredentialKind {
        self.method
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the lease runs out, or `None` for non-expiring tokens.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.lease_duration.is_zero() {
            return None;
        }
        chrono::Duration::from_std(self.lease_duration).ok().map(|ttl| self.issued_at + ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_follows_lease() {
        let session =
            Session::new("s.token".into(), CredentialKind::AppRole, Duration::from_secs(3600));
        let expires = session.expires_at().unwrap();
        assert_eq!((expires - session.issued_at()).num_seconds(), 3600);
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let session = Session::new("s.root".into(), CredentialKind::Token, Duration::ZERO);
        assert!(session.expires_at().is_none());
    }

    #[test]
    fn test_empty_accessor_is_dropped() {
        let session = Session::new("s.token".into(), CredentialKind::Token, Duration::ZERO)
            .with_accessor(Some(String::new()))
            .with_renewable(true);
        assert!(session.accessor().is_none());
        assert!(session.renewable());
        assert!(!format!("{:?}", session).contains("s.token"));
    }
}
