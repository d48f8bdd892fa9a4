//! Rolling availability and latency statistics computed from stored results.

use serde::Serialize;

use crate::database::models::{StatusCounts, StatusRecord};
use crate::monitoring::types::ServiceStatus;

/// Availability and latency over a window of results for one service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub total_checks: u64,
    pub up: u64,
    pub slow: u64,
    pub down: u64,
    /// Share of checks that were responsive (UP or SLOW), 0.0 to 100.0
    pub availability_pct: f64,
    pub avg_latency_ms: Option<f64>,
    pub min_latency_ms: Option<u64>,
    pub max_latency_ms: Option<u64>,
}

/// Ecosystem-wide summary across all services in a window
#[derive(Debug, Clone, Serialize)]
pub struct EcosystemSummary {
    pub total_checks: u64,
    pub up: u64,
    pub slow: u64,
    pub down: u64,
    pub availability_pct: f64,
}

/// How many services are currently in each state, from their latest results
#[derive(Debug, Clone, Default, Serialize)]
pub struct EcosystemSnapshot {
    pub services: u64,
    pub up: u64,
    pub slow: u64,
    pub down: u64,
}

fn availability_pct(responsive: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    responsive as f64 / total as f64 * 100.0
}

/// Compute rolling stats over a slice of results for one service.
///
/// UNKNOWN rows are counted toward the total but never toward
/// availability, so a window of unparseable history reads as 0%.
pub fn service_stats(records: &[StatusRecord]) -> ServiceStats {
    let mut up = 0u64;
    let mut slow = 0u64;
    let mut down = 0u64;

    let mut latency_sum = 0u64;
    let mut latency_count = 0u64;
    let mut min_latency: Option<u64> = None;
    let mut max_latency: Option<u64> = None;

    for record in records {
        match record.status {
            ServiceStatus::Up => up += 1,
            ServiceStatus::Slow => slow += 1,
            ServiceStatus::Down => down += 1,
            ServiceStatus::Unknown => {}
        }

        // Latency is only meaningful for checks that got a response.
        if record.status != ServiceStatus::Down {
            if let Some(latency) = record.latency_ms {
                latency_sum += latency;
                latency_count += 1;
                min_latency = Some(min_latency.map_or(latency, |m| m.min(latency)));
                max_latency = Some(max_latency.map_or(latency, |m| m.max(latency)));
            }
        }
    }

    let total = records.len() as u64;

    ServiceStats {
        total_checks: total,
        up,
        slow,
        down,
        availability_pct: availability_pct(up + slow, total),
        avg_latency_ms: if latency_count > 0 {
            Some(latency_sum as f64 / latency_count as f64)
        } else {
            None
        },
        min_latency_ms: min_latency,
        max_latency_ms: max_latency,
    }
}

/// Count services by their most recent status. Callers pass the output of
/// `latest_statuses`, one record per service.
pub fn ecosystem_snapshot(latest: &[StatusRecord]) -> EcosystemSnapshot {
    let mut snapshot = EcosystemSnapshot { services: latest.len() as u64, ..Default::default() };

    for record in latest {
        match record.status {
            ServiceStatus::Up => snapshot.up += 1,
            ServiceStatus::Slow => snapshot.slow += 1,
            ServiceStatus::Down => snapshot.down += 1,
            ServiceStatus::Unknown => {}
        }
    }

    snapshot
}

/// Summarize ecosystem-wide counts into an availability figure.
pub fn ecosystem_summary(counts: StatusCounts) -> EcosystemSummary {
    EcosystemSummary {
        total_checks: counts.total(),
        up: counts.up,
        slow: counts.slow,
        down: counts.down,
        availability_pct: availability_pct(counts.up + counts.slow, counts.total()),
    }
}
