use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::monitoring::types::{CheckResult, ServiceId, ServiceStatus};

/// One stored row of the check history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub id: Option<i64>,
    pub service: ServiceId,
    pub status: ServiceStatus,
    pub latency_ms: Option<u64>,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
    pub timestamp: SystemTime,
    pub created_at: SystemTime,
}

impl StatusRecord {
    /// Create a record from a check result
    pub fn from_check(result: &CheckResult) -> Self {
        Self {
            id: None,
            service: result.service.clone(),
            status: result.status,
            latency_ms: result.latency_ms,
            status_code: result.status_code,
            error_message: result.error_message.clone(),
            timestamp: result.timestamp,
            created_at: SystemTime::now(),
        }
    }

    /// Convert SystemTime to Unix timestamp
    pub fn timestamp_to_i64(time: SystemTime) -> i64 {
        time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
    }

    /// Convert Unix timestamp to SystemTime
    pub fn i64_to_timestamp(timestamp: i64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(timestamp.max(0) as u64)
    }
}

/// Counts of stored results by status over a time window
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub up: u64,
    pub slow: u64,
    pub down: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.up + self.slow + self.down
    }
}

/// Kind of a raised alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    ServiceDown,
    SlowResponse,
    ServiceRecovered,
}

impl AlertKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SERVICE_DOWN" => Some(AlertKind::ServiceDown),
            "SLOW_RESPONSE" => Some(AlertKind::SlowResponse),
            "SERVICE_RECOVERED" => Some(AlertKind::ServiceRecovered),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::ServiceDown => write!(f, "SERVICE_DOWN"),
            AlertKind::SlowResponse => write!(f, "SLOW_RESPONSE"),
            AlertKind::ServiceRecovered => write!(f, "SERVICE_RECOVERED"),
        }
    }
}

/// A raised (and possibly resolved) alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Option<i64>,
    pub uuid: Uuid,
    pub kind: AlertKind,
    pub service: ServiceId,
    pub message: String,
    pub raised_at: SystemTime,
    pub resolved: bool,
    pub resolved_at: Option<SystemTime>,
}

impl Alert {
    /// Create a new open alert
    pub fn new(kind: AlertKind, service: ServiceId, message: impl Into<String>) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            kind,
            service,
            message: message.into(),
            raised_at: SystemTime::now(),
            resolved: false,
            resolved_at: None,
        }
    }
}
