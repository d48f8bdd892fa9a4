//! In-memory store backing unit and route tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;
use uuid::Uuid;

use super::models::{Alert, AlertKind, StatusCounts, StatusRecord};
use super::repository::Store;
use crate::monitoring::types::{CheckResult, ServiceId, ServiceStatus};

#[derive(Default)]
struct Inner {
    statuses: Vec<StatusRecord>,
    alerts: Vec<Alert>,
    next_status_id: i64,
    next_alert_id: i64,
}

/// Store backed by plain vectors behind a mutex.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save_status(&self, result: &CheckResult) -> Result<i64> {
        let mut inner = self.lock();
        inner.next_status_id += 1;
        let id = inner.next_status_id;

        let mut record = StatusRecord::from_check(result);
        record.id = Some(id);
        inner.statuses.push(record);

        Ok(id)
    }

    async fn latest_statuses(&self) -> Result<Vec<StatusRecord>> {
        let inner = self.lock();
        let mut latest: HashMap<ServiceId, StatusRecord> = HashMap::new();

        for record in &inner.statuses {
            match latest.get(&record.service) {
                Some(existing) if existing.id >= record.id => {}
                _ => {
                    latest.insert(record.service.clone(), record.clone());
                }
            }
        }

        let mut records: Vec<StatusRecord> = latest.into_values().collect();
        records.sort_by(|a, b| a.service.cmp(&b.service));
        Ok(records)
    }

    async fn recent_results(
        &self,
        service: &ServiceId,
        limit: usize,
    ) -> Result<Vec<StatusRecord>> {
        let inner = self.lock();
        let mut records: Vec<StatusRecord> = inner
            .statuses
            .iter()
            .filter(|r| &r.service == service)
            .cloned()
            .collect();

        records.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        records.truncate(limit);
        Ok(records)
    }

    async fn results_since(
        &self,
        service: &ServiceId,
        since: SystemTime,
    ) -> Result<Vec<StatusRecord>> {
        let inner = self.lock();
        let mut records: Vec<StatusRecord> = inner
            .statuses
            .iter()
            .filter(|r| &r.service == service && r.timestamp > since)
            .cloned()
            .collect();

        records.sort_by(|a, b| (a.timestamp, a.id).cmp(&(b.timestamp, b.id)));
        Ok(records)
    }

    async fn status_counts_since(&self, since: SystemTime) -> Result<StatusCounts> {
        let inner = self.lock();
        let mut counts = StatusCounts::default();

        for record in inner.statuses.iter().filter(|r| r.timestamp > since) {
            match record.status {
                ServiceStatus::Up => counts.up += 1,
                ServiceStatus::Slow => counts.slow += 1,
                ServiceStatus::Down => counts.down += 1,
                ServiceStatus::Unknown => {}
            }
        }

        Ok(counts)
    }

    async fn save_alert(&self, alert: &Alert) -> Result<i64> {
        let mut inner = self.lock();
        inner.next_alert_id += 1;
        let id = inner.next_alert_id;

        let mut alert = alert.clone();
        alert.id = Some(id);
        inner.alerts.push(alert);

        Ok(id)
    }

    async fn open_alert(&self, service: &ServiceId, kind: AlertKind) -> Result<Option<Alert>> {
        let inner = self.lock();
        Ok(inner
            .alerts
            .iter()
            .filter(|a| !a.resolved && &a.service == service && a.kind == kind)
            .max_by_key(|a| (a.raised_at, a.id))
            .cloned())
    }

    async fn resolve_alert(&self, uuid: Uuid, resolved_at: SystemTime) -> Result<()> {
        let mut inner = self.lock();
        for alert in inner.alerts.iter_mut().filter(|a| a.uuid == uuid) {
            alert.resolved = true;
            alert.resolved_at = Some(resolved_at);
        }
        Ok(())
    }

    async fn open_alerts(&self) -> Result<Vec<Alert>> {
        let inner = self.lock();
        let mut alerts: Vec<Alert> = inner.alerts.iter().filter(|a| !a.resolved).cloned().collect();
        alerts.sort_by(|a, b| (b.raised_at, b.id).cmp(&(a.raised_at, a.id)));
        Ok(alerts)
    }

    async fn recent_alerts(&self, limit: usize, include_resolved: bool) -> Result<Vec<Alert>> {
        let inner = self.lock();
        let mut alerts: Vec<Alert> = inner
            .alerts
            .iter()
            .filter(|a| include_resolved || !a.resolved)
            .cloned()
            .collect();

        alerts.sort_by(|a, b| (b.raised_at, b.id).cmp(&(a.raised_at, a.id)));
        alerts.truncate(limit);
        Ok(alerts)
    }

    async fn prune_results_before(&self, cutoff: SystemTime) -> Result<u64> {
        let mut inner = self.lock();
        let before = inner.statuses.len();
        inner.statuses.retain(|r| r.timestamp >= cutoff);
        Ok((before - inner.statuses.len()) as u64)
    }

    async fn prune_resolved_alerts_before(&self, cutoff: SystemTime) -> Result<u64> {
        let mut inner = self.lock();
        let before = inner.alerts.len();
        inner
            .alerts
            .retain(|a| !(a.resolved && a.resolved_at.unwrap_or(a.raised_at) < cutoff));
        Ok((before - inner.alerts.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn svc() -> ServiceId {
        ServiceId::new("GOV/1234/SYS", "getInfo")
    }

    #[tokio::test]
    async fn latest_statuses_returns_newest_per_service() {
        let store = MemoryStore::new();
        store.save_status(&CheckResult::new(svc()).up(50, 200)).await.unwrap();
        store
            .save_status(&CheckResult::new(svc()).down(None, Some(500), "HTTP 500".into()))
            .await
            .unwrap();

        let latest = store.latest_statuses().await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].status, ServiceStatus::Down);
    }

    #[tokio::test]
    async fn open_alert_ignores_resolved() {
        let store = MemoryStore::new();
        let alert = Alert::new(AlertKind::ServiceDown, svc(), "down");
        store.save_alert(&alert).await.unwrap();

        assert!(store.open_alert(&svc(), AlertKind::ServiceDown).await.unwrap().is_some());

        store.resolve_alert(alert.uuid, SystemTime::now()).await.unwrap();
        assert!(store.open_alert(&svc(), AlertKind::ServiceDown).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn prune_ages_alerts_from_resolution_time() {
        let store = MemoryStore::new();

        let mut alert = Alert::new(AlertKind::ServiceDown, svc(), "down");
        alert.raised_at = SystemTime::now() - Duration::from_secs(10 * 24 * 3600);
        store.save_alert(&alert).await.unwrap();
        store.resolve_alert(alert.uuid, SystemTime::now()).await.unwrap();

        let cutoff = SystemTime::now() - Duration::from_secs(7 * 24 * 3600);
        assert_eq!(store.prune_resolved_alerts_before(cutoff).await.unwrap(), 0);

        // Once the resolution itself is old enough, the alert goes.
        store
            .resolve_alert(alert.uuid, SystemTime::now() - Duration::from_secs(8 * 24 * 3600))
            .await
            .unwrap();
        assert_eq!(store.prune_resolved_alerts_before(cutoff).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn prune_results_removes_old_rows() {
        let store = MemoryStore::new();
        let mut old = CheckResult::new(svc()).up(10, 200);
        old.timestamp = SystemTime::now() - Duration::from_secs(3600);
        store.save_status(&old).await.unwrap();
        store.save_status(&CheckResult::new(svc()).up(20, 200)).await.unwrap();

        let removed = store
            .prune_results_before(SystemTime::now() - Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.latest_statuses().await.unwrap().len(), 1);
    }
}
