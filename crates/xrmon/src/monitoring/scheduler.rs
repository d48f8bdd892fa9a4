use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use super::executor::CheckRunner;
use super::types::{CheckResult, ServiceId};

/// Schedule entry for a single service
#[derive(Debug, Clone)]
pub struct ScheduledService {
    pub service: ServiceId,
    pub interval_seconds: u64,
    pub enabled: bool,
}

/// Monitoring scheduler - coordinates periodic execution of health checks
pub struct MonitoringScheduler {
    runner: Arc<dyn CheckRunner>,
    result_tx: mpsc::Sender<CheckResult>,
}

impl MonitoringScheduler {
    /// Create a new monitoring scheduler
    pub fn new(runner: Arc<dyn CheckRunner>, result_tx: mpsc::Sender<CheckResult>) -> Self {
        Self { runner, result_tx }
    }

    /// Schedule a single service for periodic checking
    pub fn schedule_service(&self, entry: ScheduledService) -> tokio::task::JoinHandle<()> {
        let runner = self.runner.clone();
        let result_tx = self.result_tx.clone();

        tokio::spawn(async move {
            if !entry.enabled {
                return;
            }

            let mut timer = interval(Duration::from_secs(entry.interval_seconds));

            loop {
                timer.tick().await;

                let result = runner.run_check(entry.service.clone()).await;

                if let Err(e) = result_tx.send(result).await {
                    tracing::error!("Failed to send check result: {}", e);
                    break;
                }
            }
        })
    }

    /// Schedule multiple services
    pub fn schedule_services(
        &self,
        entries: Vec<ScheduledService>,
    ) -> Vec<tokio::task::JoinHandle<()>> {
        entries.into_iter().map(|entry| self.schedule_service(entry)).collect()
    }
}
