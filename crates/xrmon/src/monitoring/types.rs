use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Identity of a monitored X-Road service: the subsystem identifier
/// (`INSTANCE/CLASS/CODE` or `INSTANCE/CLASS/CODE/SUBSYSTEM`) plus the
/// service code invoked on it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServiceId {
    pub subsystem: String,
    pub service: String,
}

impl ServiceId {
    pub fn new(subsystem: impl Into<String>, service: impl Into<String>) -> Self {
        Self { subsystem: subsystem.into(), service: service.into() }
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.subsystem, self.service)
    }
}

/// Status of a health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceStatus {
    Up,
    Slow,
    Down,
    Unknown,
}

impl ServiceStatus {
    /// Parse the database representation back into a status.
    pub fn parse(s: &str) -> Self {
        match s {
            "UP" => ServiceStatus::Up,
            "SLOW" => ServiceStatus::Slow,
            "DOWN" => ServiceStatus::Down,
            _ => ServiceStatus::Unknown,
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Up => write!(f, "UP"),
            ServiceStatus::Slow => write!(f, "SLOW"),
            ServiceStatus::Down => write!(f, "DOWN"),
            ServiceStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Result of a single health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Service that was checked
    pub service: ServiceId,

    /// When the check was performed
    pub timestamp: SystemTime,

    /// Classified status (UP/SLOW/DOWN/UNKNOWN)
    pub status: ServiceStatus,

    /// Round-trip time in milliseconds
    pub latency_ms: Option<u64>,

    /// HTTP status code returned by the Security Server (if any)
    pub status_code: Option<u16>,

    /// Error message (if the check failed)
    pub error_message: Option<String>,
}

impl CheckResult {
    /// Create a new, not yet classified check result
    pub fn new(service: ServiceId) -> Self {
        Self {
            service,
            timestamp: SystemTime::now(),
            status: ServiceStatus::Unknown,
            latency_ms: None,
            status_code: None,
            error_message: None,
        }
    }

    /// Mark the check as successful
    pub fn up(mut self, latency_ms: u64, status_code: u16) -> Self {
        self.status = ServiceStatus::Up;
        self.latency_ms = Some(latency_ms);
        self.status_code = Some(status_code);
        self
    }

    /// Mark the check as successful but slower than the configured threshold
    pub fn slow(mut self, latency_ms: u64, status_code: u16) -> Self {
        self.status = ServiceStatus::Slow;
        self.latency_ms = Some(latency_ms);
        self.status_code = Some(status_code);
        self
    }

    /// Mark the check as failed
    pub fn down(
        mut self,
        latency_ms: Option<u64>,
        status_code: Option<u16>,
        error: String,
    ) -> Self {
        self.status = ServiceStatus::Down;
        self.latency_ms = latency_ms;
        self.status_code = status_code;
        self.error_message = Some(error);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_round_trips() {
        for status in [
            ServiceStatus::Up,
            ServiceStatus::Slow,
            ServiceStatus::Down,
            ServiceStatus::Unknown,
        ] {
            assert_eq!(ServiceStatus::parse(&status.to_string()), status);
        }
    }

    #[test]
    fn unrecognized_status_parses_as_unknown() {
        assert_eq!(ServiceStatus::parse("degraded"), ServiceStatus::Unknown);
        assert_eq!(ServiceStatus::parse(""), ServiceStatus::Unknown);
    }

    #[test]
    fn check_result_builders_set_fields() {
        let id = ServiceId::new("DEV/GOV/12345678/TestSystem", "testService");

        let up = CheckResult::new(id.clone()).up(120, 200);
        assert_eq!(up.status, ServiceStatus::Up);
        assert_eq!(up.latency_ms, Some(120));
        assert_eq!(up.status_code, Some(200));
        assert!(up.error_message.is_none());

        let down = CheckResult::new(id).down(None, Some(503), "HTTP 503".to_string());
        assert_eq!(down.status, ServiceStatus::Down);
        assert_eq!(down.error_message.as_deref(), Some("HTTP 503"));
    }

    #[test]
    fn service_id_display_joins_with_slash() {
        let id = ServiceId::new("DEV/GOV/12345678", "listMethods");
        assert_eq!(id.to_string(), "DEV/GOV/12345678/listMethods");
    }
}
