//! # Process Lifecycle
//!
//! Drives the gateway through its phases:
//!
//! `Unconfigured → ConfigLoaded → Authenticated → Serving → Draining → Terminated`
//!
//! The listener is only bound once the secrets session is established. On a
//! shutdown signal the server stops accepting, in-flight requests get
//! `server.shutdown_grace_seconds` to finish, and the session token is revoked
//! exactly once on every exit path.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::api::{bind_listener, build_router, serve, ApiState, SecretPaths};
use crate::config::Settings;
use crate::errors::{Error, Result};
use crate::observability::{HealthChecker, UrlHealthProvider};
use crate::secrets::SecretsClient;

/// Process phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unconfigured,
    ConfigLoaded,
    Authenticated,
    Serving,
    Draining,
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Unconfigured => "unconfigured",
            Phase::ConfigLoaded => "config_loaded",
            Phase::Authenticated => "authenticated",
            Phase::Serving => "serving",
            Phase::Draining => "draining",
            Phase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Why the process is shutting down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    SigInt,
    SigTerm,
    Requested,
    Unknown,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShutdownReason::SigInt => "SIGINT",
            ShutdownReason::SigTerm => "SIGTERM",
            ShutdownReason::Requested => "requested",
            ShutdownReason::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Name of the backend checker in the `/health` document.
pub const VAULT_CHECKER: &str = "Vault";

/// Owns the configured pieces and runs them in order.
pub struct Lifecycle {
    settings: Settings,
    client: Arc<SecretsClient>,
    health: HealthChecker,
    phase: Phase,
}

impl Lifecycle {
    /// Assemble a lifecycle from loaded settings. No network calls.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let client = SecretsClient::from_settings(&settings.vault)?;
        let health = HealthChecker::new()
            .with_provider(VAULT_CHECKER, Arc::new(UrlHealthProvider::for_vault(&settings.vault)?));
        Ok(Self::new(settings, Arc::new(client), health))
    }

    pub fn new(settings: Settings, client: Arc<SecretsClient>, health: HealthChecker) -> Self {
        let mut lifecycle = Self { settings, client, health, phase: Phase::Unconfigured };
        lifecycle.transition(Phase::ConfigLoaded);
        lifecycle
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn client(&self) -> &Arc<SecretsClient> {
        &self.client
    }

    /// Authenticate, bind `server.host:server.port`, serve until `shutdown`
    /// resolves, then drain and revoke.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ShutdownReason> + Send,
    {
        if let Err(e) = self.authenticate().await {
            self.terminate().await;
            return Err(e);
        }

        let result = match bind_listener(&self.settings.server.bind_address()).await {
            Ok(listener) => self.serve_until(listener, shutdown).await,
            Err(e) => Err(e),
        };

        self.terminate().await;
        result
    }

    /// Like [`run`](Self::run) on an already bound listener.
    pub async fn run_on<F>(&mut self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ShutdownReason> + Send,
    {
        let result = match self.authenticate().await {
            Ok(()) => self.serve_until(listener, shutdown).await,
            Err(e) => Err(e),
        };

        self.terminate().await;
        result
    }

    async fn authenticate(&mut self) -> Result<()> {
        match self.client.initialize().await {
            Ok(()) => {
                self.transition(Phase::Authenticated);
                Ok(())
            }
            Err(e) => {
                error!(method = %self.client.credential_kind(), error = %e, "Vault authentication failed");
                Err(e.into())
            }
        }
    }

    async fn serve_until<F>(&mut self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ShutdownReason> + Send,
    {
        let state = ApiState::new(
            self.client.clone(),
            self.health.clone(),
            SecretPaths::from_settings(&self.settings),
        );
        let token = CancellationToken::new();
        let mut server = tokio::spawn(serve(listener, build_router(state), token.clone()));
        self.transition(Phase::Serving);

        tokio::pin!(shutdown);
        tokio::select! {
            joined = &mut server => {
                self.transition(Phase::Draining);
                warn!("API server stopped without a shutdown signal");
                flatten(joined)
            }
            reason = &mut shutdown => {
                info!(reason = %reason, "Shutdown signal received");
                self.transition(Phase::Draining);
                token.cancel();
                self.drain(server).await
            }
        }
    }

    async fn drain(&self, mut server: JoinHandle<Result<()>>) -> Result<()> {
        let grace = self.settings.server.shutdown_grace();
        match tokio::time::timeout(grace, &mut server).await {
            Ok(joined) => flatten(joined),
            Err(_) => {
                warn!(
                    grace_secs = grace.as_secs(),
                    "In-flight requests did not finish within the grace period, aborting"
                );
                server.abort();
                Ok(())
            }
        }
    }

    async fn terminate(&mut self) {
        self.client.close().await;
        self.transition(Phase::Terminated);
    }

    fn transition(&mut self, next: Phase) {
        info!(from = %self.phase, to = %next, "Lifecycle transition");
        self.phase = next;
    }
}

fn flatten(joined: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    match joined {
        Ok(result) => result,
        Err(e) => Err(Error::internal(format!("API server task failed: {}", e))),
    }
}

/// Resolves on SIGINT or SIGTERM (Ctrl-C only on non-unix targets).
pub async fn shutdown_signal() -> ShutdownReason {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => ShutdownReason::SigInt,
            Err(e) => {
                error!(error = %e, "Failed to register ctrl-c handler");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let term = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                ShutdownReason::SigTerm
            }
            Err(e) => {
                error!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let term = std::future::pending::<ShutdownReason>();

    tokio::select! {
        reason = ctrl_c => reason,
        reason = term => reason,
    }
}
