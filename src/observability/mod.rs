//! # Observability Infrastructure
//!
//! Structured logging and live health checks.

pub mod health;
pub mod logging;

pub use health::{HealthCheck, HealthChecker, HealthProvider, HealthReport, HealthStatus, UrlHealthProvider};
pub use logging::{init_logging, log_config_info};
