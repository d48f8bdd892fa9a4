//! Wiring for the long-running agent and the one-shot CLI commands.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info};

use xrmon::alerting::{
    AlertEvaluator, CompositeNotifier, LogNotifier, Notifier, WebhookNotifier,
};
use xrmon::config::Config;
use xrmon::database::{initialize_database, LibsqlStore, Store};
use xrmon::monitoring::executor::{CheckExecutor, CheckRunner};
use xrmon::monitoring::scheduler::{MonitoringScheduler, ScheduledService};
use xrmon::monitoring::types::{CheckResult, ServiceId, ServiceStatus};
use xrmon::retention::{RetentionCleanup, RetentionPolicy};
use xrmon::stats::service_stats;
use xrmon::{pool, stats};

use crate::output;

async fn open_store(config: &Config) -> Result<Arc<dyn Store>> {
    let pool = pool::open(&config.database.path).await?;

    let conn = pool.get().await?;
    initialize_database(&conn).await?;
    drop(conn);

    Ok(Arc::new(LibsqlStore::new_from_pool(pool)))
}

fn build_executor(config: &Config) -> Result<CheckExecutor> {
    CheckExecutor::new(
        &config.xroad.server,
        &config.xroad.client,
        config.collector.timeout_seconds,
        config.collector.slow_threshold_ms,
    )
}

fn build_notifier(config: &Config) -> Arc<dyn Notifier> {
    let mut channels: Vec<Box<dyn Notifier>> = vec![Box::new(LogNotifier::new())];

    if let Some(url) = &config.alerts.webhook_url {
        channels.push(Box::new(WebhookNotifier::new(url.clone())));
    }

    Arc::new(CompositeNotifier::new(channels))
}

/// Run the monitoring agent until interrupted.
pub async fn run(config: Config) -> Result<()> {
    let store = open_store(&config).await?;

    let runner: Arc<dyn CheckRunner> = Arc::new(build_executor(&config)?);
    let notifier = build_notifier(&config);
    let mut evaluator = AlertEvaluator::new(
        store.clone(),
        notifier,
        config.alerts.failure_threshold,
        config.alerts.notify_recovery,
    );

    let policy = RetentionPolicy {
        result_days: config.database.retention_days.max(0) as u64,
        resolved_alert_days: config.database.resolved_alert_retention_days.max(0) as u64,
    };
    let _cleanup = RetentionCleanup::new(store.clone(), policy).start_periodic_cleanup();

    let (result_tx, mut result_rx) = mpsc::channel(64);
    let scheduler = MonitoringScheduler::new(runner, result_tx);

    let entries: Vec<ScheduledService> = config
        .services
        .iter()
        .map(|entry| ScheduledService {
            service: entry.id(),
            interval_seconds: config.interval_for(entry),
            enabled: entry.enabled,
        })
        .collect();

    info!(
        services = entries.iter().filter(|e| e.enabled).count(),
        server = %config.xroad.server,
        "monitoring agent started"
    );
    let _handles = scheduler.schedule_services(entries);

    loop {
        tokio::select! {
            maybe_result = result_rx.recv() => {
                let Some(result) = maybe_result else { break };
                handle_result(store.as_ref(), &mut evaluator, &result).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

/// Persist and evaluate one result. A transient store failure (a locked
/// database file, for instance) is logged and must not take the agent down
/// with every scheduled monitor.
async fn handle_result(store: &dyn Store, evaluator: &mut AlertEvaluator, result: &CheckResult) {
    info!(
        service = %result.service,
        status = %result.status,
        latency_ms = result.latency_ms,
        "check completed"
    );

    if let Err(e) = store.save_status(result).await {
        error!(service = %result.service, "failed to persist check result: {e:#}");
    }

    if let Err(e) = evaluator.evaluate(result).await {
        error!(service = %result.service, "alert evaluation failed: {e:#}");
    }
}

/// Probe every enabled service once and print the outcome. Fails when any
/// service is DOWN so the exit code is usable from cron or shell checks.
pub async fn check_once(config: Config) -> Result<()> {
    let executor = build_executor(&config)?;

    let mut results = Vec::new();
    for entry in config.services.iter().filter(|e| e.enabled) {
        results.push(executor.run_check(entry.id()).await);
    }

    print!("{}", output::render_check_results(&results));

    let down = results.iter().filter(|r| r.status == ServiceStatus::Down).count();
    if down > 0 {
        anyhow::bail!("{down} service(s) DOWN");
    }
    Ok(())
}

/// Print the latest stored status and 24h availability of each service.
pub async fn show_status(config: Config) -> Result<()> {
    let store = open_store(&config).await?;
    let since = SystemTime::now() - Duration::from_secs(24 * 3600);

    let latest = store.latest_statuses().await?;
    let snapshot = stats::ecosystem_snapshot(&latest);

    let mut rows = Vec::new();
    for record in latest {
        let window = store.results_since(&record.service, since).await?;
        rows.push((record, service_stats(&window)));
    }

    let summary = stats::ecosystem_summary(store.status_counts_since(since).await?);
    let open = store.open_alerts().await?;

    print!("{}", output::render_status(&rows, &snapshot, &summary, &open));
    Ok(())
}

/// Print recent results for one service, newest first.
pub async fn show_history(
    config: Config,
    subsystem: String,
    service: String,
    limit: usize,
) -> Result<()> {
    let store = open_store(&config).await?;
    let id = ServiceId::new(subsystem, service);

    let records = store.recent_results(&id, limit).await?;
    print!("{}", output::render_history(&id, &records));
    Ok(())
}
