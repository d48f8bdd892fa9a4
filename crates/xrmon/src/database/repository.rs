use anyhow::{anyhow, Result};
use async_trait::async_trait;
use libsql::params;
use std::time::SystemTime;
use uuid::Uuid;

use super::models::{Alert, AlertKind, StatusCounts, StatusRecord};
use crate::monitoring::types::{CheckResult, ServiceId, ServiceStatus};
use crate::pool::LibsqlPool;

/// Store trait for abstracting database operations
#[async_trait]
pub trait Store: Send + Sync {
    /// Append a check result to the history
    async fn save_status(&self, result: &CheckResult) -> Result<i64>;

    /// Most recent stored result for every known service
    async fn latest_statuses(&self) -> Result<Vec<StatusRecord>>;

    /// Recent results for one service, newest first
    async fn recent_results(&self, service: &ServiceId, limit: usize)
        -> Result<Vec<StatusRecord>>;

    /// Results for one service newer than `since`, oldest first
    async fn results_since(
        &self,
        service: &ServiceId,
        since: SystemTime,
    ) -> Result<Vec<StatusRecord>>;

    /// Counts of results by status newer than `since`, across all services
    async fn status_counts_since(&self, since: SystemTime) -> Result<StatusCounts>;

    /// Persist a raised alert
    async fn save_alert(&self, alert: &Alert) -> Result<i64>;

    /// Unresolved alert of the given kind for a service, if one exists
    async fn open_alert(&self, service: &ServiceId, kind: AlertKind) -> Result<Option<Alert>>;

    /// Mark an alert resolved
    async fn resolve_alert(&self, uuid: Uuid, resolved_at: SystemTime) -> Result<()>;

    /// All unresolved alerts, newest first
    async fn open_alerts(&self) -> Result<Vec<Alert>>;

    /// Recent alerts, optionally including resolved ones, newest first
    async fn recent_alerts(&self, limit: usize, include_resolved: bool) -> Result<Vec<Alert>>;

    /// Delete results older than `cutoff`; returns the number of rows removed
    async fn prune_results_before(&self, cutoff: SystemTime) -> Result<u64>;

    /// Delete resolved alerts older than `cutoff`
    async fn prune_resolved_alerts_before(&self, cutoff: SystemTime) -> Result<u64>;
}

const STATUS_COLUMNS: &str =
    "id, subsystem, service, status, latency_ms, status_code, error_message, timestamp, created_at";

const ALERT_COLUMNS: &str =
    "id, uuid, kind, subsystem, service, message, raised_at, resolved, resolved_at";

fn row_to_status(row: &libsql::Row) -> Result<StatusRecord> {
    let status_str: String = row.get(3)?;

    Ok(StatusRecord {
        id: Some(row.get(0)?),
        service: ServiceId::new(row.get::<String>(1)?, row.get::<String>(2)?),
        status: ServiceStatus::parse(&status_str),
        latency_ms: row.get::<Option<i64>>(4)?.map(|v| v as u64),
        status_code: row.get::<Option<i64>>(5)?.map(|v| v as u16),
        error_message: row.get(6)?,
        timestamp: StatusRecord::i64_to_timestamp(row.get(7)?),
        created_at: StatusRecord::i64_to_timestamp(row.get(8)?),
    })
}

fn row_to_alert(row: &libsql::Row) -> Result<Alert> {
    let uuid_str: String = row.get(1)?;
    let kind_str: String = row.get(2)?;

    Ok(Alert {
        id: Some(row.get(0)?),
        uuid: Uuid::parse_str(&uuid_str)?,
        kind: AlertKind::parse(&kind_str)
            .ok_or_else(|| anyhow!("unknown alert kind: {}", kind_str))?,
        service: ServiceId::new(row.get::<String>(3)?, row.get::<String>(4)?),
        message: row.get(5)?,
        raised_at: StatusRecord::i64_to_timestamp(row.get(6)?),
        resolved: row.get::<i64>(7)? != 0,
        resolved_at: row.get::<Option<i64>>(8)?.map(StatusRecord::i64_to_timestamp),
    })
}

/// LibSQL store implementation
pub struct LibsqlStore {
    pool: LibsqlPool,
}

impl LibsqlStore {
    /// Create a new store instance from a pool
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<deadpool::managed::Object<crate::pool::LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl Store for LibsqlStore {
    async fn save_status(&self, result: &CheckResult) -> Result<i64> {
        let conn = self.get_conn().await?;
        let timestamp = StatusRecord::timestamp_to_i64(result.timestamp);
        let created_at = StatusRecord::timestamp_to_i64(SystemTime::now());

        conn.execute(
            "INSERT INTO service_status (subsystem, service, status, latency_ms, status_code, error_message, timestamp, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                result.service.subsystem.clone(),
                result.service.service.clone(),
                result.status.to_string(),
                result.latency_ms.map(|v| v as i64),
                result.status_code.map(|v| v as i64),
                result.error_message.clone(),
                timestamp,
                created_at
            ],
        )
        .await?;

        Ok(conn.last_insert_rowid())
    }

    async fn latest_statuses(&self) -> Result<Vec<StatusRecord>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT {STATUS_COLUMNS} FROM service_status
             WHERE id IN (SELECT MAX(id) FROM service_status GROUP BY subsystem, service)
             ORDER BY subsystem, service"
        );
        let mut stmt = conn.prepare(&sql).await?;

        let mut rows = stmt.query(()).await?;
        let mut records = Vec::new();

        while let Some(row) = rows.next().await? {
            records.push(row_to_status(&row)?);
        }

        Ok(records)
    }

    async fn recent_results(
        &self,
        service: &ServiceId,
        limit: usize,
    ) -> Result<Vec<StatusRecord>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT {STATUS_COLUMNS} FROM service_status
             WHERE subsystem = ? AND service = ?
             ORDER BY timestamp DESC, id DESC LIMIT ?"
        );
        let mut stmt = conn.prepare(&sql).await?;

        let mut rows = stmt
            .query(params![
                service.subsystem.clone(),
                service.service.clone(),
                limit as i64
            ])
            .await?;
        let mut records = Vec::new();

        while let Some(row) = rows.next().await? {
            records.push(row_to_status(&row)?);
        }

        Ok(records)
    }

    async fn results_since(
        &self,
        service: &ServiceId,
        since: SystemTime,
    ) -> Result<Vec<StatusRecord>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT {STATUS_COLUMNS} FROM service_status
             WHERE subsystem = ? AND service = ? AND timestamp > ?
             ORDER BY timestamp ASC, id ASC"
        );
        let mut stmt = conn.prepare(&sql).await?;

        let mut rows = stmt
            .query(params![
                service.subsystem.clone(),
                service.service.clone(),
                StatusRecord::timestamp_to_i64(since)
            ])
            .await?;
        let mut records = Vec::new();

        while let Some(row) = rows.next().await? {
            records.push(row_to_status(&row)?);
        }

        Ok(records)
    }

    async fn status_counts_since(&self, since: SystemTime) -> Result<StatusCounts> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare(
                "SELECT status, COUNT(*) FROM service_status WHERE timestamp > ? GROUP BY status",
            )
            .await?;

        let mut rows = stmt.query(params![StatusRecord::timestamp_to_i64(since)]).await?;
        let mut counts = StatusCounts::default();

        while let Some(row) = rows.next().await? {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            match ServiceStatus::parse(&status) {
                ServiceStatus::Up => counts.up = count as u64,
                ServiceStatus::Slow => counts.slow = count as u64,
                ServiceStatus::Down => counts.down = count as u64,
                ServiceStatus::Unknown => {}
            }
        }

        Ok(counts)
    }

    async fn save_alert(&self, alert: &Alert) -> Result<i64> {
        let conn = self.get_conn().await?;

        conn.execute(
            "INSERT INTO alerts (uuid, kind, subsystem, service, message, raised_at, resolved, resolved_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                alert.uuid.to_string(),
                alert.kind.to_string(),
                alert.service.subsystem.clone(),
                alert.service.service.clone(),
                alert.message.clone(),
                StatusRecord::timestamp_to_i64(alert.raised_at),
                if alert.resolved { 1 } else { 0 },
                alert.resolved_at.map(StatusRecord::timestamp_to_i64)
            ],
        )
        .await?;

        Ok(conn.last_insert_rowid())
    }

    async fn open_alert(&self, service: &ServiceId, kind: AlertKind) -> Result<Option<Alert>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT {ALERT_COLUMNS} FROM alerts
             WHERE subsystem = ? AND service = ? AND kind = ? AND resolved = 0
             ORDER BY raised_at DESC LIMIT 1"
        );
        let mut stmt = conn.prepare(&sql).await?;

        let mut rows = stmt
            .query(params![
                service.subsystem.clone(),
                service.service.clone(),
                kind.to_string()
            ])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row_to_alert(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn resolve_alert(&self, uuid: Uuid, resolved_at: SystemTime) -> Result<()> {
        let conn = self.get_conn().await?;

        conn.execute(
            "UPDATE alerts SET resolved = 1, resolved_at = ? WHERE uuid = ?",
            params![StatusRecord::timestamp_to_i64(resolved_at), uuid.to_string()],
        )
        .await?;

        Ok(())
    }

    async fn open_alerts(&self) -> Result<Vec<Alert>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT {ALERT_COLUMNS} FROM alerts WHERE resolved = 0 ORDER BY raised_at DESC"
        );
        let mut stmt = conn.prepare(&sql).await?;

        let mut rows = stmt.query(()).await?;
        let mut alerts = Vec::new();

        while let Some(row) = rows.next().await? {
            alerts.push(row_to_alert(&row)?);
        }

        Ok(alerts)
    }

    async fn recent_alerts(&self, limit: usize, include_resolved: bool) -> Result<Vec<Alert>> {
        let conn = self.get_conn().await?;
        let sql = if include_resolved {
            format!("SELECT {ALERT_COLUMNS} FROM alerts ORDER BY raised_at DESC LIMIT ?")
        } else {
            format!(
                "SELECT {ALERT_COLUMNS} FROM alerts WHERE resolved = 0 ORDER BY raised_at DESC LIMIT ?"
            )
        };
        let mut stmt = conn.prepare(&sql).await?;

        let mut rows = stmt.query(params![limit as i64]).await?;
        let mut alerts = Vec::new();

        while let Some(row) = rows.next().await? {
            alerts.push(row_to_alert(&row)?);
        }

        Ok(alerts)
    }

    async fn prune_results_before(&self, cutoff: SystemTime) -> Result<u64> {
        let conn = self.get_conn().await?;

        let deleted = conn
            .execute(
                "DELETE FROM service_status WHERE timestamp < ?",
                params![StatusRecord::timestamp_to_i64(cutoff)],
            )
            .await?;

        Ok(deleted)
    }

    async fn prune_resolved_alerts_before(&self, cutoff: SystemTime) -> Result<u64> {
        let conn = self.get_conn().await?;

        // Age from when the alert was resolved, not raised, so a fresh
        // recovery on a long-standing alert is not pruned immediately.
        let deleted = conn
            .execute(
                "DELETE FROM alerts WHERE resolved = 1 AND COALESCE(resolved_at, raised_at) < ?",
                params![StatusRecord::timestamp_to_i64(cutoff)],
            )
            .await?;

        Ok(deleted)
    }
}
