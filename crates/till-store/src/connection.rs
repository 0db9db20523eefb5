//! `SQLite` connection pooling.
//!
//! An `r2d2` pool over `r2d2_sqlite`. The [`PragmaCustomizer`] runs on every
//! connection the pool opens, so WAL mode, foreign-key enforcement and the
//! busy timeout hold uniformly no matter which pooled connection a caller
//! ends up with.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use uuid::Uuid;

use crate::errors::Result;

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Configuration for the connection pool.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum pool size (default: 8).
    pub pool_size: u32,
    /// Busy timeout in milliseconds (default: 5000).
    pub busy_timeout_ms: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

/// `SQLite` pragma customizer that runs on each new connection.
#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = {};\
             PRAGMA foreign_keys = ON;\
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms
        ))?;
        Ok(())
    }
}

fn build_pool(manager: SqliteConnectionManager, config: &PoolConfig) -> Result<ConnectionPool> {
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(std::time::Duration::from_secs(5))
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
        }))
        .build(manager)?;
    Ok(pool)
}

/// Create an in-memory connection pool (for testing).
///
/// Every connection in the pool shares one database via a uniquely named
/// shared-cache URI; a plain `:memory:` manager would give each pooled
/// connection its own empty database.
pub fn new_in_memory(config: &PoolConfig) -> Result<ConnectionPool> {
    let uri = format!("file:till-mem-{}?mode=memory&cache=shared", Uuid::now_v7());
    build_pool(SqliteConnectionManager::file(uri), config)
}

/// Create a file-backed connection pool.
pub fn new_file(path: &str, config: &PoolConfig) -> Result<ConnectionPool> {
    build_pool(SqliteConnectionManager::file(path), config)
}
