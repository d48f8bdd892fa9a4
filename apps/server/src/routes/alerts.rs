use std::time::SystemTime;

use actix_web::{HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xrmon::database::Store;
use xrmon::database::models::Alert;

use crate::error::ApiError;

const ALERT_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct AlertsQuery {
    #[serde(default)]
    include_resolved: bool,
}

#[derive(Serialize)]
struct AlertEntry {
    uuid: String,
    kind: String,
    subsystem: String,
    service: String,
    message: String,
    raised_at: String,
    resolved: bool,
    resolved_at: Option<String>,
}

fn rfc3339(time: SystemTime) -> String {
    let dt: DateTime<Utc> = time.into();
    dt.to_rfc3339()
}

fn entry(alert: &Alert) -> AlertEntry {
    AlertEntry {
        uuid: alert.uuid.to_string(),
        kind: alert.kind.to_string(),
        subsystem: alert.service.subsystem.clone(),
        service: alert.service.service.clone(),
        message: alert.message.clone(),
        raised_at: rfc3339(alert.raised_at),
        resolved: alert.resolved,
        resolved_at: alert.resolved_at.map(rfc3339),
    }
}

/// Recent alerts, open ones only unless `include_resolved=true`.
#[get("/api/v1/alerts")]
pub async fn list_alerts(
    store: web::Data<dyn Store>,
    query: web::Query<AlertsQuery>,
) -> Result<HttpResponse, ApiError> {
    let alerts = store.recent_alerts(ALERT_LIMIT, query.include_resolved).await?;
    let entries: Vec<AlertEntry> = alerts.iter().map(entry).collect();

    Ok(HttpResponse::Ok().json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};
    use std::sync::Arc;
    use xrmon::database::MemoryStore;
    use xrmon::database::models::AlertKind;
    use xrmon::monitoring::types::ServiceId;

    #[actix_web::test]
    async fn hides_resolved_alerts_by_default() {
        let store = Arc::new(MemoryStore::new());
        let svc = ServiceId::new("GOV/1234/SYS", "getInfo");

        let open = Alert::new(AlertKind::ServiceDown, svc.clone(), "down");
        let resolved = Alert::new(AlertKind::SlowResponse, svc, "slow");
        store.save_alert(&open).await.unwrap();
        store.save_alert(&resolved).await.unwrap();
        store.resolve_alert(resolved.uuid, SystemTime::now()).await.unwrap();

        let data: web::Data<dyn Store> = web::Data::from(store as Arc<dyn Store>);
        let app = test::init_service(App::new().app_data(data).service(list_alerts)).await;

        let req = test::TestRequest::get().uri("/api/v1/alerts").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["kind"], "SERVICE_DOWN");

        let req = test::TestRequest::get()
            .uri("/api/v1/alerts?include_resolved=true")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }
}
