//! Automatic retention and cleanup of stored data.
//!
//! This module manages data lifecycle:
//! - Check results: Cleaned up after 30 days
//! - Resolved alerts: Cleaned up after 7 days (open alerts are never pruned)
//!
//! Cleanup runs periodically (every hour) as a background task.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

use crate::database::repository::Store;

/// Retention policy for stored results and alerts
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Days to keep check results
    pub result_days: u64,
    /// Days to keep resolved alerts
    pub resolved_alert_days: u64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { result_days: 30, resolved_alert_days: 7 }
    }
}

impl RetentionPolicy {
    fn result_cutoff(&self, now: SystemTime) -> SystemTime {
        now - Duration::from_secs(self.result_days * 24 * 3600)
    }

    fn alert_cutoff(&self, now: SystemTime) -> SystemTime {
        now - Duration::from_secs(self.resolved_alert_days * 24 * 3600)
    }
}

/// Cleanup manager for expired results and alerts
pub struct RetentionCleanup {
    store: Arc<dyn Store>,
    policy: RetentionPolicy,
}

impl RetentionCleanup {
    /// Create a new retention cleanup manager
    pub fn new(store: Arc<dyn Store>, policy: RetentionPolicy) -> Self {
        Self { store, policy }
    }

    /// Run one cleanup pass over results and resolved alerts
    pub async fn cleanup_expired(&self) -> Result<(u64, u64)> {
        let now = SystemTime::now();

        let results = self.store.prune_results_before(self.policy.result_cutoff(now)).await?;
        let alerts =
            self.store.prune_resolved_alerts_before(self.policy.alert_cutoff(now)).await?;

        info!(
            "Retention cleanup completed: {} results and {} resolved alerts deleted",
            results, alerts
        );

        Ok((results, alerts))
    }

    /// Start background cleanup task (runs every hour)
    pub fn start_periodic_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let policy = self.policy.clone();

        tokio::spawn(async move {
            let cleanup = RetentionCleanup::new(store, policy);
            let mut interval = tokio::time::interval(Duration::from_secs(3600));

            loop {
                interval.tick().await;

                match cleanup.cleanup_expired().await {
                    Ok((results, alerts)) => {
                        debug!(results, alerts, "periodic cleanup completed");
                    }
                    Err(e) => {
                        warn!("Periodic cleanup failed: {}", e);
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::{Alert, AlertKind};
    use crate::monitoring::types::{CheckResult, ServiceId};

    #[test]
    fn retention_policy_defaults() {
        let policy = RetentionPolicy::default();
        assert_eq!(policy.result_days, 30);
        assert_eq!(policy.resolved_alert_days, 7);
    }

    #[test]
    fn cutoffs_subtract_whole_days() {
        let policy = RetentionPolicy { result_days: 14, resolved_alert_days: 2 };
        let now = SystemTime::now();
        assert_eq!(now.duration_since(policy.result_cutoff(now)).unwrap().as_secs(), 14 * 24 * 3600);
        assert_eq!(now.duration_since(policy.alert_cutoff(now)).unwrap().as_secs(), 2 * 24 * 3600);
    }

    #[tokio::test]
    async fn cleanup_removes_old_data_only() {
        let store = Arc::new(MemoryStore::new());
        let svc = ServiceId::new("GOV/1234/SYS", "getInfo");

        let mut old = CheckResult::new(svc.clone()).up(10, 200);
        old.timestamp = SystemTime::now() - Duration::from_secs(40 * 24 * 3600);
        store.save_status(&old).await.unwrap();
        store.save_status(&CheckResult::new(svc.clone()).up(20, 200)).await.unwrap();

        // An open alert older than the cutoff must survive.
        let mut stale_open = Alert::new(AlertKind::ServiceDown, svc.clone(), "down");
        stale_open.raised_at = SystemTime::now() - Duration::from_secs(40 * 24 * 3600);
        store.save_alert(&stale_open).await.unwrap();

        let cleanup = RetentionCleanup::new(store.clone(), RetentionPolicy::default());
        let (results, alerts) = cleanup.cleanup_expired().await.unwrap();

        assert_eq!(results, 1);
        assert_eq!(alerts, 0);
        assert_eq!(store.open_alerts().await.unwrap().len(), 1);
    }
}
