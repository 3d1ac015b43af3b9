//! # Health Checking
//!
//! Live health reporting for the gateway and its dependencies. Every check
//! runs on demand; nothing is cached.
//!
//! The report serializes as
//!
//! ```json
//! {"status": "UP", "Vault": {"status": "UP", "code": 200}}
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::VaultSettings;
use crate::errors::{Error, Result};

/// Health status for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, HealthStatus::Up)
    }
}

/// Result of one checker run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: HealthStatus,

    /// HTTP status returned by the checked endpoint, when one answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthCheck {
    pub fn up(code: u16) -> Self {
        Self { status: HealthStatus::Up, code: Some(code), error: None }
    }

    pub fn down<S: Into<String>>(message: S) -> Self {
        Self { status: HealthStatus::Down, code: None, error: Some(message.into()) }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }
}

/// Component that provides health checking functionality
#[async_trait]
pub trait HealthProvider: Send + Sync {
    /// Perform a health check for this component
    async fn health_check(&self) -> HealthCheck;
}

/// Checks a URL; HTTP 200 is `UP`, anything else is `DOWN`.
#[derive(Debug, Clone)]
pub struct UrlHealthProvider {
    http: reqwest::Client,
    url: String,
}

impl UrlHealthProvider {
    pub fn new<S: Into<String>>(url: S, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal(format!("Failed to build health check client: {}", e)))?;
        Ok(Self { http, url: url.into() })
    }

    /// Checker for the backend's `sys/health` endpoint.
    pub fn for_vault(vault: &VaultSettings) -> Result<Self> {
        Self::new(vault.health_url(), vault.timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl HealthProvider for UrlHealthProvider {
    async fn health_check(&self) -> HealthCheck {
        match self.http.get(&self.url).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                HealthCheck::up(response.status().as_u16())
            }
            Ok(response) => {
                let status = response.status();
                debug!(url = %self.url, status = status.as_u16(), "Health check returned non-200");
                HealthCheck::down(format!("unexpected status {}", status)).with_code(status.as_u16())
            }
            Err(e) => {
                debug!(url = %self.url, error = %e, "Health check request failed");
                HealthCheck::down(e.to_string())
            }
        }
    }
}

/// Aggregate health document
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,

    #[serde(flatten)]
    pub checks: BTreeMap<String, HealthCheck>,
}

impl HealthReport {
    pub fn is_up(&self) -> bool {
        self.status.is_up()
    }
}

/// Runs every registered provider and folds the results into a report.
#[derive(Clone, Default)]
pub struct HealthChecker {
    providers: Vec<(String, Arc<dyn HealthProvider>)>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a health provider under `name`
    pub fn with_provider<S: Into<String>>(
        mut self,
        name: S,
        provider: Arc<dyn HealthProvider>,
    ) -> Self {
        self.providers.push((name.into(), provider));
        self
    }

    /// Perform health checks for all registered providers. `UP` only when
    /// every check is `UP`; an empty checker is `UP`.
    pub async fn check_all(&self) -> HealthReport {
        let results = run_checks(&self.providers).await;

        let status = if results.values().all(|check| check.status.is_up()) {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        };

        HealthReport { status, checks: results }
    }

    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|(name, _)| name.as_str())
    }
}

impl std::fmt::Debug for HealthChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthChecker")
            .field("providers", &self.provider_names().collect::<Vec<_>>())
            .finish()
    }
}

async fn run_checks(
    providers: &[(String, Arc<dyn HealthProvider>)],
) -> BTreeMap<String, HealthCheck> {
    let mut tasks = tokio::task::JoinSet::new();
    for (name, provider) in providers {
        let name = name.clone();
        let provider = provider.clone();
        tasks.spawn(async move { (name, provider.health_check().await) });
    }

    let mut results = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((name, check)) => {
                results.insert(name, check);
            }
            Err(e) => debug!(error = %e, "Health check task failed"),
        }
    }

    // A provider whose task panicked still shows up, as DOWN.
    for (name, _) in providers {
        results
            .entry(name.clone())
            .or_insert_with(|| HealthCheck::down("health check task failed"));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct MockHealthProvider {
        check: HealthCheck,
    }

    #[async_trait]
    impl HealthProvider for MockHealthProvider {
        async fn health_check(&self) -> HealthCheck {
            self.check.clone()
        }
    }

    fn mock(check: HealthCheck) -> Arc<dyn HealthProvider> {
        Arc::new(MockHealthProvider { check })
    }

    #[tokio::test]
    async fn test_empty_checker_is_up() {
        let report = HealthChecker::new().check_all().await;
        assert!(report.is_up());
        assert_eq!(serde_json::to_value(&report).unwrap(), serde_json::json!({"status": "UP"}));
    }

    #[tokio::test]
    async fn test_report_shape() {
        let checker = HealthChecker::new().with_provider("vault", mock(HealthCheck::up(200)));
        let report = checker.check_all().await;

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({"status": "UP", "vault": {"status": "UP", "code": 200}})
        );
    }

    #[tokio::test]
    async fn test_any_down_makes_report_down() {
        let checker = HealthChecker::new()
            .with_provider("vault", mock(HealthCheck::up(200)))
            .with_provider("other", mock(HealthCheck::down("connection refused")));
        let report = checker.check_all().await;

        assert!(!report.is_up());
        assert_eq!(report.checks["other"].error.as_deref(), Some("connection refused"));
        assert!(report.checks["vault"].status.is_up());
    }

    #[tokio::test]
    async fn test_url_provider_up_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/sys/health"))
            .and(query_param("perfstandbyok", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "initialized": true,
                "sealed": false
            })))
            .mount(&server)
            .await;

        let provider = UrlHealthProvider::new(
            format!("{}/v1/sys/health?perfstandbyok=true", server.uri()),
            Duration::from_secs(2),
        )
        .unwrap();

        assert_eq!(provider.health_check().await, HealthCheck::up(200));
    }

    #[tokio::test]
    async fn test_url_provider_down_when_sealed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/sys/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = UrlHealthProvider::new(
            format!("{}/v1/sys/health?perfstandbyok=true", server.uri()),
            Duration::from_secs(2),
        )
        .unwrap();

        let check = provider.health_check().await;
        assert_eq!(check.status, HealthStatus::Down);
        assert_eq!(check.code, Some(503));
    }

    #[tokio::test]
    async fn test_url_provider_down_when_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let provider =
            UrlHealthProvider::new(format!("http://127.0.0.1:{}/v1/sys/health", port), Duration::from_secs(2))
                .unwrap();

        let check = provider.health_check().await;
        assert_eq!(check.status, HealthStatus::Down);
        assert!(check.code.is_none());
        assert!(check.error.is_some());
    }

    #[test]
    fn test_for_vault_uses_health_url() {
        let provider = UrlHealthProvider::for_vault(&VaultSettings::default()).unwrap();
        assert_eq!(provider.url(), "http://127.0.0.1:8200/v1/sys/health?perfstandbyok=true");
    }
}
