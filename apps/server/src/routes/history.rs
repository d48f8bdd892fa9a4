use std::time::{Duration, SystemTime};

use actix_web::{HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xrmon::database::Store;
use xrmon::database::models::StatusRecord;
use xrmon::monitoring::types::ServiceId;
use xrmon::stats::{ServiceStats, service_stats};

use crate::error::ApiError;

const MAX_WINDOW_HOURS: u64 = 720;

#[derive(Deserialize)]
pub struct HistoryQuery {
    subsystem: String,
    service: String,
    /// Window size in hours, newest results first
    #[serde(default = "default_hours")]
    hours: u64,
}

fn default_hours() -> u64 {
    24
}

#[derive(Serialize)]
struct HistoryEntry {
    timestamp: String,
    status: String,
    latency_ms: Option<u64>,
    status_code: Option<u16>,
    error_message: Option<String>,
}

#[derive(Serialize)]
struct HistoryResponse {
    subsystem: String,
    service: String,
    hours: u64,
    stats: ServiceStats,
    results: Vec<HistoryEntry>,
}

fn entry(record: &StatusRecord) -> HistoryEntry {
    let dt: DateTime<Utc> = record.timestamp.into();

    HistoryEntry {
        timestamp: dt.to_rfc3339(),
        status: record.status.to_string(),
        latency_ms: record.latency_ms,
        status_code: record.status_code,
        error_message: record.error_message.clone(),
    }
}

/// Check history of one service over a time window.
#[get("/api/v1/history")]
pub async fn service_history(
    store: web::Data<dyn Store>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ApiError> {
    if query.hours == 0 || query.hours > MAX_WINDOW_HOURS {
        return Err(ApiError::Query(format!(
            "hours must be between 1 and {MAX_WINDOW_HOURS}"
        )));
    }

    let id = ServiceId::new(query.subsystem.clone(), query.service.clone());
    let since = SystemTime::now() - Duration::from_secs(query.hours * 3600);

    let records = store.results_since(&id, since).await?;
    let stats = service_stats(&records);

    let mut results: Vec<HistoryEntry> = records.iter().map(entry).collect();
    results.reverse();

    Ok(HttpResponse::Ok().json(HistoryResponse {
        subsystem: query.subsystem.clone(),
        service: query.service.clone(),
        hours: query.hours,
        stats,
        results,
    }))
}
