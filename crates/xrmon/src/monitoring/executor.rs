use anyhow::Result;
use std::sync::Arc;

use super::checker::{Checker, Probe, ProbeError, XRoadChecker};
use super::types::{CheckResult, ServiceId};

/// Runs a single check for a service. The scheduler only depends on this
/// trait so it can be driven by a stub in tests.
#[async_trait::async_trait]
pub trait CheckRunner: Send + Sync {
    async fn run_check(&self, service: ServiceId) -> CheckResult;
}

/// Executes health checks and classifies the outcome as UP/SLOW/DOWN.
pub struct CheckExecutor {
    checker: Arc<dyn Checker>,
    slow_threshold_ms: u64,
}

impl CheckExecutor {
    /// Create an executor probing through the given Security Server.
    pub fn new(
        server: &str,
        client_id: &str,
        timeout_seconds: u64,
        slow_threshold_ms: u64,
    ) -> Result<Self> {
        let checker = XRoadChecker::new(server, client_id, timeout_seconds)?;
        Ok(Self { checker: Arc::new(checker), slow_threshold_ms })
    }

    /// Create an executor around an existing checker (used by tests).
    pub fn with_checker(checker: Arc<dyn Checker>, slow_threshold_ms: u64) -> Self {
        Self { checker, slow_threshold_ms }
    }

    fn classify(&self, result: CheckResult, probe: Probe) -> CheckResult {
        // 2xx and 3xx count as a responding service
        if (200..400).contains(&probe.status_code) {
            if probe.latency_ms > self.slow_threshold_ms {
                result.slow(probe.latency_ms, probe.status_code)
            } else {
                result.up(probe.latency_ms, probe.status_code)
            }
        } else {
            result.down(
                Some(probe.latency_ms),
                Some(probe.status_code),
                format!("HTTP {}", probe.status_code),
            )
        }
    }
}

#[async_trait::async_trait]
impl CheckRunner for CheckExecutor {
    async fn run_check(&self, service: ServiceId) -> CheckResult {
        let result = CheckResult::new(service.clone());

        match self.checker.check(&service).await {
            Ok(probe) => self.classify(result, probe),
            // A timed-out probe is recorded with the full timeout as latency,
            // so latency graphs show the ceiling instead of a gap.
            Err(ProbeError::Timeout(ms)) => {
                result.down(Some(ms), None, ProbeError::Timeout(ms).to_string())
            }
            Err(e) => result.down(None, None, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::ServiceStatus;

    struct FixedChecker(Result<Probe, ProbeError>);

    #[async_trait::async_trait]
    impl Checker for FixedChecker {
        async fn check(&self, _service: &ServiceId) -> Result<Probe, ProbeError> {
            match &self.0 {
                Ok(probe) => Ok(*probe),
                Err(ProbeError::Timeout(ms)) => Err(ProbeError::Timeout(*ms)),
                Err(ProbeError::Transport(msg)) => Err(ProbeError::Transport(msg.clone())),
            }
        }
    }

    fn ok(latency_ms: u64, status_code: u16) -> Arc<dyn Checker> {
        Arc::new(FixedChecker(Ok(Probe { latency_ms, status_code })))
    }

    fn err(e: ProbeError) -> Arc<dyn Checker> {
        Arc::new(FixedChecker(Err(e)))
    }

    fn service() -> ServiceId {
        ServiceId::new("GOV/12345678/TestSystem", "testService")
    }

    #[tokio::test]
    async fn fast_success_is_up() {
        let executor = CheckExecutor::with_checker(ok(150, 200), 3000);
        let result = executor.run_check(service()).await;

        assert_eq!(result.status, ServiceStatus::Up);
        assert_eq!(result.latency_ms, Some(150));
        assert_eq!(result.status_code, Some(200));
    }

    #[tokio::test]
    async fn success_over_threshold_is_slow() {
        let executor = CheckExecutor::with_checker(ok(4200, 200), 3000);
        let result = executor.run_check(service()).await;

        assert_eq!(result.status, ServiceStatus::Slow);
        assert_eq!(result.latency_ms, Some(4200));
    }

    #[tokio::test]
    async fn redirect_counts_as_responding() {
        let executor = CheckExecutor::with_checker(ok(80, 302), 3000);
        let result = executor.run_check(service()).await;

        assert_eq!(result.status, ServiceStatus::Up);
    }

    #[tokio::test]
    async fn http_error_is_down_with_code() {
        let executor = CheckExecutor::with_checker(ok(95, 503), 3000);
        let result = executor.run_check(service()).await;

        assert_eq!(result.status, ServiceStatus::Down);
        assert_eq!(result.status_code, Some(503));
        assert_eq!(result.error_message.as_deref(), Some("HTTP 503"));
        // latency of the failed request is still recorded
        assert_eq!(result.latency_ms, Some(95));
    }

    #[tokio::test]
    async fn timeout_records_timeout_as_latency() {
        let executor = CheckExecutor::with_checker(err(ProbeError::Timeout(10_000)), 3000);
        let result = executor.run_check(service()).await;

        assert_eq!(result.status, ServiceStatus::Down);
        assert_eq!(result.latency_ms, Some(10_000));
        assert!(result.error_message.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn transport_error_is_down_without_latency() {
        let executor = CheckExecutor::with_checker(
            err(ProbeError::Transport("connection refused".to_string())),
            3000,
        );
        let result = executor.run_check(service()).await;

        assert_eq!(result.status, ServiceStatus::Down);
        assert_eq!(result.latency_ms, None);
        assert!(result.error_message.unwrap().contains("connection refused"));
    }
}
