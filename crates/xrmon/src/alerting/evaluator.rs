use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{info, warn};

use super::notifier::Notifier;
use crate::database::models::{Alert, AlertKind};
use crate::database::repository::Store;
use crate::monitoring::types::{CheckResult, ServiceId, ServiceStatus};

/// Turns a stream of check results into raised and resolved alerts.
///
/// A SERVICE_DOWN alert is raised only after `failure_threshold`
/// consecutive DOWN results, so a single flaky probe does not page
/// anyone. SLOW_RESPONSE alerts are raised immediately. Both kinds are
/// deduplicated against the open alert already in the store, and only
/// an UP result resolves them.
pub struct AlertEvaluator {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    failure_threshold: u32,
    notify_recovery: bool,
    down_streaks: HashMap<ServiceId, u32>,
}

impl AlertEvaluator {
    pub fn new(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        failure_threshold: u32,
        notify_recovery: bool,
    ) -> Self {
        Self {
            store,
            notifier,
            failure_threshold: failure_threshold.max(1),
            notify_recovery,
            down_streaks: HashMap::new(),
        }
    }

    /// Evaluate one classified result against the alert state.
    pub async fn evaluate(&mut self, result: &CheckResult) -> Result<()> {
        match result.status {
            ServiceStatus::Down => self.on_down(result).await,
            ServiceStatus::Slow => self.on_slow(result).await,
            ServiceStatus::Up => self.on_up(result).await,
            ServiceStatus::Unknown => Ok(()),
        }
    }

    async fn on_down(&mut self, result: &CheckResult) -> Result<()> {
        let streak = self.down_streaks.entry(result.service.clone()).or_insert(0);
        *streak += 1;
        let streak = *streak;

        if streak < self.failure_threshold {
            info!(
                service = %result.service,
                streak,
                threshold = self.failure_threshold,
                "service DOWN, below alert threshold"
            );
            return Ok(());
        }

        if self.store.open_alert(&result.service, AlertKind::ServiceDown).await?.is_some() {
            return Ok(());
        }

        let detail = result.error_message.as_deref().unwrap_or("no response");
        let message = format!(
            "{} is DOWN after {} consecutive failed checks ({})",
            result.service, streak, detail
        );

        self.raise(AlertKind::ServiceDown, &result.service, message).await
    }

    async fn on_slow(&mut self, result: &CheckResult) -> Result<()> {
        self.down_streaks.remove(&result.service);

        if self.store.open_alert(&result.service, AlertKind::SlowResponse).await?.is_some() {
            return Ok(());
        }

        let latency = result.latency_ms.unwrap_or(0);
        let message = format!("{} responded in {latency} ms", result.service);

        self.raise(AlertKind::SlowResponse, &result.service, message).await
    }

    async fn on_up(&mut self, result: &CheckResult) -> Result<()> {
        self.down_streaks.remove(&result.service);

        let mut resolved_any = false;
        for kind in [AlertKind::ServiceDown, AlertKind::SlowResponse] {
            if let Some(alert) = self.store.open_alert(&result.service, kind).await? {
                self.store.resolve_alert(alert.uuid, SystemTime::now()).await?;
                info!(service = %result.service, kind = %kind, "alert resolved");
                resolved_any = true;
            }
        }

        if resolved_any && self.notify_recovery {
            // Recovery is a notification, not a stored alert.
            let mut recovery = Alert::new(
                AlertKind::ServiceRecovered,
                result.service.clone(),
                format!("{} has recovered and is responding normally", result.service),
            );
            recovery.resolved = true;
            recovery.resolved_at = Some(SystemTime::now());

            if let Err(e) = self.notifier.notify(&recovery).await {
                warn!(service = %result.service, "recovery notification failed: {e}");
            }
        }

        Ok(())
    }

    async fn raise(
        &self,
        kind: AlertKind,
        service: &ServiceId,
        message: String,
    ) -> Result<()> {
        let alert = Alert::new(kind, service.clone(), message);
        self.store.save_alert(&alert).await?;
        info!(service = %service, kind = %kind, "alert raised");

        if let Err(e) = self.notifier.notify(&alert).await {
            warn!(service = %service, "alert notification failed: {e}");
        }

        Ok(())
    }
}
