//! Storage layer
//!
//! Append-only history of check results plus the alert ledger, stored in
//! LibSQL (SQLite). The agent owns the schema; the API server only reads.

pub mod memory;
pub mod migrations;
pub mod models;
pub mod repository;

pub use memory::MemoryStore;
pub use repository::{LibsqlStore, Store};

use anyhow::Result;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
