use std::time::{Duration, Instant};

use thiserror::Error;

use super::types::ServiceId;

/// Transport-level outcome of a probe: the gateway answered, whatever the
/// HTTP code was. Classification happens in the executor.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub latency_ms: u64,
    pub status_code: u16,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    #[error("request failed: {0}")]
    Transport(String),
}

/// Checker trait for service probes
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Probe the service once and report latency plus the HTTP status code.
    async fn check(&self, service: &ServiceId) -> Result<Probe, ProbeError>;
}

/// Probes services through the Security Server REST gateway by calling the
/// metaservice `listMethods` on each configured subsystem/service pair.
pub struct XRoadChecker {
    client: reqwest::Client,
    server: String,
    client_header: String,
    timeout_ms: u64,
}

impl XRoadChecker {
    pub fn new(server: &str, client_id: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            server: server.trim_end_matches('/').to_string(),
            client_header: client_id.to_string(),
            timeout_ms: timeout_seconds * 1000,
        })
    }

    fn probe_url(&self, service: &ServiceId) -> String {
        format!("{}/r1/{}/{}/listMethods", self.server, service.subsystem, service.service)
    }
}

#[async_trait::async_trait]
impl Checker for XRoadChecker {
    async fn check(&self, service: &ServiceId) -> Result<Probe, ProbeError> {
        let start = Instant::now();

        let response = self
            .client
            .get(self.probe_url(service))
            .header("Accept", "application/json")
            .header("X-Road-Client", &self.client_header)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout(self.timeout_ms)
                } else {
                    ProbeError::Transport(e.to_string())
                }
            })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let status_code = response.status().as_u16();

        Ok(Probe { latency_ms, status_code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_url_targets_list_methods() {
        let checker =
            XRoadChecker::new("http://localhost:8080/", "DEV/12345678/MonitoringAgent", 10)
                .unwrap();
        let id = ServiceId::new("GOV/12345678/TestSystem", "testService");

        assert_eq!(
            checker.probe_url(&id),
            "http://localhost:8080/r1/GOV/12345678/TestSystem/testService/listMethods"
        );
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let checker = XRoadChecker::new("https://ss.example.org//", "DEV/X/Y", 5).unwrap();
        let id = ServiceId::new("GOV/1/A", "svc");

        assert_eq!(checker.probe_url(&id), "https://ss.example.org/r1/GOV/1/A/svc/listMethods");
    }

    #[test]
    fn timeout_error_reports_milliseconds() {
        let err = ProbeError::Timeout(10_000);
        assert_eq!(err.to_string(), "request timed out after 10000 ms");
    }
}
