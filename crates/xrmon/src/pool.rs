//! Connection pooling over a local LibSQL database file.

use std::sync::atomic::{AtomicUsize, Ordering};

use deadpool::managed::{self, Pool, RecycleError, RecycleResult};
use libsql::{params, Connection, Database, Error as LibsqlError};

pub type LibsqlPool = Pool<LibsqlManager>;

/// Open (or create) the database file at `path` and wrap it in a pool.
pub async fn open(path: &str) -> anyhow::Result<LibsqlPool> {
    let db = libsql::Builder::new_local(path).build().await?;
    let manager = LibsqlManager::new(db);
    let pool = Pool::builder(manager).config(managed::PoolConfig::default()).build()?;
    Ok(pool)
}

pub struct LibsqlManager {
    database: Database,
    recycle_count: AtomicUsize,
}

impl LibsqlManager {
    pub fn new(database: Database) -> Self {
        Self { database, recycle_count: AtomicUsize::new(0) }
    }
}

impl managed::Manager for LibsqlManager {
    type Type = Connection;
    type Error = LibsqlError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        self.database.connect()
    }

    // Round-trips a counter through the connection so a broken connection
    // is dropped from the pool instead of handed back out.
    async fn recycle(
        &self,
        conn: &mut Self::Type,
        _: &managed::Metrics,
    ) -> RecycleResult<Self::Error> {
        let expected = self.recycle_count.fetch_add(1, Ordering::Relaxed) as u64;

        let row = conn
            .query("SELECT ?1", params![expected])
            .await?
            .next()
            .await?
            .ok_or(LibsqlError::QueryReturnedNoRows)?;

        if row.get::<u64>(0)? != expected {
            return Err(RecycleError::message("connection returned stale data"));
        }

        Ok(())
    }
}
