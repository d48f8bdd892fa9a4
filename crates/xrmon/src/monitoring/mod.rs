//! Monitoring engine - handles execution of X-Road health checks
//!
//! This module is responsible for:
//! - Probing service endpoints over the Security Server REST gateway
//! - Classifying responses as UP/SLOW/DOWN
//! - Scheduling periodic checks per service
//! - Validating service identifiers and timing bounds

pub mod checker;
pub mod executor;
pub mod scheduler;
pub mod types;
pub mod validation;

pub use executor::CheckExecutor;
pub use scheduler::MonitoringScheduler;
pub use types::{CheckResult, ServiceId, ServiceStatus};
