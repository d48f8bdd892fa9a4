//! Plain-text rendering for the CLI commands.

use std::time::SystemTime;

use chrono::{DateTime, Utc};

use xrmon::database::models::{Alert, StatusRecord};
use xrmon::monitoring::types::{CheckResult, ServiceId};
use xrmon::stats::{EcosystemSnapshot, EcosystemSummary, ServiceStats};

fn format_time(time: SystemTime) -> String {
    let dt: DateTime<Utc> = time.into();
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn format_latency(latency_ms: Option<u64>) -> String {
    match latency_ms {
        Some(ms) => format!("{ms} ms"),
        None => "-".into(),
    }
}

pub fn render_check_results(results: &[CheckResult]) -> String {
    let mut out = String::new();

    for result in results {
        out.push_str(&format!(
            "{:<6} {} ({})",
            result.status.to_string(),
            result.service,
            format_latency(result.latency_ms)
        ));
        if let Some(error) = &result.error_message {
            out.push_str(&format!(" - {error}"));
        }
        out.push('\n');
    }

    if results.is_empty() {
        out.push_str("No enabled services configured.\n");
    }

    out
}

pub fn render_status(
    rows: &[(StatusRecord, ServiceStats)],
    snapshot: &EcosystemSnapshot,
    summary: &EcosystemSummary,
    open_alerts: &[Alert],
) -> String {
    let mut out = String::new();

    if rows.is_empty() {
        out.push_str("No check results stored yet.\n");
        return out;
    }

    for (record, stats) in rows {
        out.push_str(&format!(
            "{:<6} {} (last seen {}, {:.1}% over 24h, {} checks)\n",
            record.status.to_string(),
            record.service,
            format_time(record.timestamp),
            stats.availability_pct,
            stats.total_checks
        ));
    }

    out.push_str(&format!(
        "\nServices: {} total ({} up, {} slow, {} down)\n",
        snapshot.services, snapshot.up, snapshot.slow, snapshot.down
    ));
    out.push_str(&format!(
        "Ecosystem: {:.1}% availability over 24h ({} checks: {} up, {} slow, {} down)\n",
        summary.availability_pct, summary.total_checks, summary.up, summary.slow, summary.down
    ));

    if !open_alerts.is_empty() {
        out.push_str(&format!("\nOpen alerts ({}):\n", open_alerts.len()));
        for alert in open_alerts {
            out.push_str(&format!(
                "  [{}] {} - {} (raised {})\n",
                alert.kind,
                alert.service,
                alert.message,
                format_time(alert.raised_at)
            ));
        }
    }

    out
}

pub fn render_history(service: &ServiceId, records: &[StatusRecord]) -> String {
    let mut out = String::new();

    if records.is_empty() {
        out.push_str(&format!("No stored results for {service}.\n"));
        return out;
    }

    out.push_str(&format!("History for {service} (newest first):\n"));
    for record in records {
        out.push_str(&format!(
            "  {} {:<6} {}",
            format_time(record.timestamp),
            record.status.to_string(),
            format_latency(record.latency_ms)
        ));
        if let Some(error) = &record.error_message {
            out.push_str(&format!(" - {error}"));
        }
        out.push('\n');
    }

    out
}
