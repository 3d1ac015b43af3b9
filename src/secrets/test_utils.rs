//! In-memory backend for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Notify;

use super::backend::VaultBackend;
use super::credential::Credential;
use super::envelope::Secret;
use super::error::{Result, SecretsError};
use super::session::Session;
use super::types::SecretString;

/// Records calls and answers reads from a fixed map.
#[derive(Default)]
pub struct FakeBackend {
    secrets: HashMap<String, Secret>,
    login_error: Option<String>,
    read_error: Option<String>,
    revoke_error: Option<String>,
    logins: AtomicUsize,
    reads: AtomicUsize,
    revocations: AtomicUsize,
    paths: std::sync::Mutex<Vec<String>>,
    read_delay: Duration,
    read_started: Notify,
    events: std::sync::Mutex<Vec<&'static str>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, path: &str, key: &str, value: &str) -> Self {
        let mut data = Map::new();
        data.insert(key.to_string(), Value::String(value.to_string()));
        self.secrets.insert(path.to_string(), Secret::with_data(data));
        self
    }

    pub fn failing_login(mut self, message: &str) -> Self {
        self.login_error = Some(message.to_string());
        self
    }

    pub fn failing_reads(mut self, message: &str) -> Self {
        self.read_error = Some(message.to_string());
        self
    }

    pub fn failing_revoke(mut self, message: &str) -> Self {
        self.revoke_error = Some(message.to_string());
        self
    }

    /// Every read sleeps for `delay` before answering.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    /// Resolves once a read has started (immediately if one already has).
    pub async fn wait_for_read(&self) {
        self.read_started.notified().await;
    }

    /// `read-start`, `read-end` and `revoke`, in call order.
    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    fn record(&self, event: &'static str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn revocations(&self) -> usize {
        self.revocations.load(Ordering::SeqCst)
    }

    /// Paths passed to `read`, in call order.
    pub fn read_paths(&self) -> Vec<String> {
        self.paths.lock().map(|paths| paths.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl VaultBackend for FakeBackend {
    async fn login(&self, credential: &Credential) -> Result<Session> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.login_error {
            return Err(SecretsError::authentication_failed(credential.kind(), message.clone()));
        }
        Ok(Session::new(
            SecretString::new("s.fake-session"),
            credential.kind(),
            Duration::from_secs(3600),
        ))
    }

    async fn read(&self, _token: &SecretString, path: &str) -> Result<Option<Secret>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut paths) = self.paths.lock() {
            paths.push(path.to_string());
        }
        self.record("read-start");
        self.read_started.notify_one();
        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }
        self.record("read-end");

        if let Some(message) = &self.read_error {
            return Err(SecretsError::unavailable(message.clone()));
        }
        Ok(self.secrets.get(path).cloned())
    }

    async fn revoke_self(&self, _token: &SecretString) -> Result<()> {
        self.revocations.fetch_add(1, Ordering::SeqCst);
        self.record("revoke");
        match &self.revoke_error {
            Some(message) => Err(SecretsError::backend_error(message.clone())),
            None => Ok(()),
        }
    }
}
