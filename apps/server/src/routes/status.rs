use std::time::{Duration, SystemTime};

use actix_web::{HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;

use xrmon::database::Store;
use xrmon::database::models::StatusRecord;
use xrmon::stats::{
    EcosystemSnapshot, EcosystemSummary, ecosystem_snapshot, ecosystem_summary, service_stats,
};

use crate::error::ApiError;

fn rfc3339(time: SystemTime) -> String {
    let dt: DateTime<Utc> = time.into();
    dt.to_rfc3339()
}

#[derive(Serialize)]
struct ServiceStatusEntry {
    subsystem: String,
    service: String,
    status: String,
    latency_ms: Option<u64>,
    last_check: String,
    availability_pct_24h: f64,
}

#[derive(Serialize)]
struct EcosystemStatusResponse {
    timestamp: String,
    snapshot: EcosystemSnapshot,
    summary: EcosystemSummary,
    services: Vec<ServiceStatusEntry>,
}

fn entry(record: &StatusRecord, availability_pct_24h: f64) -> ServiceStatusEntry {
    ServiceStatusEntry {
        subsystem: record.service.subsystem.clone(),
        service: record.service.service.clone(),
        status: record.status.to_string(),
        latency_ms: record.latency_ms,
        last_check: rfc3339(record.timestamp),
        availability_pct_24h,
    }
}

/// Latest status of every known service plus an ecosystem-wide summary
/// over the last 24 hours.
#[get("/api/v1/ecosystem/status")]
pub async fn ecosystem_status(store: web::Data<dyn Store>) -> Result<HttpResponse, ApiError> {
    let now = SystemTime::now();
    let since = now - Duration::from_secs(24 * 3600);

    let latest = store.latest_statuses().await?;
    let snapshot = ecosystem_snapshot(&latest);

    let mut services = Vec::new();
    for record in latest {
        let window = store.results_since(&record.service, since).await?;
        services.push(entry(&record, service_stats(&window).availability_pct));
    }

    let summary = ecosystem_summary(store.status_counts_since(since).await?);

    Ok(HttpResponse::Ok().json(EcosystemStatusResponse {
        timestamp: rfc3339(now),
        snapshot,
        summary,
        services,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};
    use std::sync::Arc;
    use xrmon::database::MemoryStore;
    use xrmon::monitoring::types::{CheckResult, ServiceId};

    #[actix_web::test]
    async fn reports_latest_status_per_service() {
        let store = Arc::new(MemoryStore::new());
        let svc = ServiceId::new("GOV/1234/SYS", "getInfo");
        store.save_status(&CheckResult::new(svc.clone()).up(100, 200)).await.unwrap();
        store.save_status(&CheckResult::new(svc).slow(4000, 200)).await.unwrap();

        let data: web::Data<dyn Store> = web::Data::from(store as Arc<dyn Store>);
        let app =
            test::init_service(App::new().app_data(data).service(ecosystem_status)).await;

        let req = test::TestRequest::get().uri("/api/v1/ecosystem/status").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["services"].as_array().unwrap().len(), 1);
        assert_eq!(body["services"][0]["status"], "SLOW");
        assert_eq!(body["summary"]["total_checks"], 2);
    }
}
