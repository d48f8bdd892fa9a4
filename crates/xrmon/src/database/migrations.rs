use anyhow::Result;
use libsql::Connection;

/// Schema version - increment when making schema changes
const SCHEMA_VERSION: i32 = 2;

/// Run database migrations
///
/// This is the single source of truth for the database schema. The API
/// server does NOT run migrations - it only reads data.
pub async fn run_migrations(conn: &Connection) -> Result<()> {
    // Create schema_migrations table first (tracks applied migrations)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL,
            description TEXT
        )",
        (),
    )
    .await?;

    let current_version = get_current_version(conn).await?;

    if current_version >= SCHEMA_VERSION {
        tracing::info!("Database schema is up to date (version {})", current_version);
        return Ok(());
    }

    tracing::info!("Running migrations from version {} to {}", current_version, SCHEMA_VERSION);

    if current_version < 1 {
        run_migration_v1(conn).await?;
        record_migration(conn, 1, "Initial schema").await?;
    }

    if current_version < 2 {
        run_migration_v2(conn).await?;
        record_migration(conn, 2, "Add alert resolution tracking").await?;
    }

    tracing::info!(
        "Database migrations completed successfully (now at version {})",
        SCHEMA_VERSION
    );
    Ok(())
}

/// Get current schema version from database
async fn get_current_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn.query("SELECT MAX(version) FROM schema_migrations", ()).await?;

    if let Some(row) = rows.next().await? {
        let version: Option<i32> = row.get(0)?;
        Ok(version.unwrap_or(0))
    } else {
        Ok(0)
    }
}

/// Record that a migration was applied
async fn record_migration(conn: &Connection, version: i32, description: &str) -> Result<()> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;

    conn.execute(
        "INSERT INTO schema_migrations (version, applied_at, description) VALUES (?, ?, ?)",
        libsql::params![version, now, description],
    )
    .await?;

    tracing::info!("Applied migration v{}: {}", version, description);
    Ok(())
}

/// Migration v1: Initial schema
/// Creates service_status and alerts tables
async fn run_migration_v1(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS service_status (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subsystem TEXT NOT NULL,
            service TEXT NOT NULL,
            status TEXT NOT NULL,
            latency_ms INTEGER,
            status_code INTEGER,
            error_message TEXT,
            timestamp INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        )",
        (),
    )
    .await?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS alerts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL,
            subsystem TEXT NOT NULL,
            service TEXT NOT NULL,
            message TEXT NOT NULL,
            raised_at INTEGER NOT NULL,
            resolved INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )
    .await?;

    // Create indexes
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_service_status_service ON service_status(subsystem, service)",
        (),
    )
    .await?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_service_status_timestamp ON service_status(timestamp DESC)",
        (),
    )
    .await?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_service_status_service_timestamp ON service_status(subsystem, service, timestamp DESC)",
        (),
    )
    .await?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_service_status_status ON service_status(status)",
        (),
    )
    .await?;

    conn.execute("CREATE INDEX IF NOT EXISTS idx_alerts_uuid ON alerts(uuid)", ()).await?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_alerts_service ON alerts(subsystem, service)",
        (),
    )
    .await?;

    Ok(())
}

/// Migration v2: Alert resolution tracking
/// Adds resolved_at so recovery time can be reported
async fn run_migration_v2(conn: &Connection) -> Result<()> {
    conn.execute("ALTER TABLE alerts ADD COLUMN resolved_at INTEGER", ()).await?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_alerts_resolved ON alerts(resolved, raised_at DESC)",
        (),
    )
    .await?;

    tracing::info!("Added alert resolution tracking");
    Ok(())
}
