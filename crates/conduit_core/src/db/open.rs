//! Connection pool bootstrap for SQLite.
//!
//! # Responsibility
//! - Build file or in-memory connection pools.
//! - Configure connection pragmas required by core behavior.
//! - Create the schema before returning a usable [`Database`].
//!
//! # Invariants
//! - Every pooled connection has `foreign_keys=ON`.
//! - The returned database has the current schema applied.
//! - An in-memory pool holds exactly one long-lived connection, so every
//!   caller sees the same data.

use super::schema::ensure_schema;
use super::{Database, DbConfig, DbPool, DbResult};
use log::{error, info};
use r2d2_sqlite::SqliteConnectionManager;
use std::time::{Duration, Instant};

/// Opens (or creates) a SQLite database file behind a connection pool.
///
/// # Side effects
/// - Creates the schema on first open.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(config: &DbConfig) -> DbResult<Database> {
    let manager = configure(SqliteConnectionManager::file(&config.path), config.busy_timeout);
    let builder = r2d2::Pool::builder()
        .max_size(config.max_connections.max(1))
        .connection_timeout(config.connection_timeout);

    open_with("file", || Ok(builder.build(manager)?))
}

/// Opens a private in-memory database behind a single-connection pool.
///
/// # Side effects
/// - Creates the schema.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Database> {
    let defaults = DbConfig::new(":memory:");
    let manager = configure(SqliteConnectionManager::memory(), defaults.busy_timeout);
    // A recycled connection would drop the whole in-memory database.
    let builder = r2d2::Pool::builder()
        .max_size(1)
        .min_idle(Some(1))
        .max_lifetime(None)
        .idle_timeout(None)
        .connection_timeout(defaults.connection_timeout);

    open_with("memory", || Ok(builder.build(manager)?))
}

fn configure(manager: SqliteConnectionManager, busy_timeout: Duration) -> SqliteConnectionManager {
    manager.with_init(move |conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(busy_timeout)
    })
}

fn open_with(mode: &str, build: impl FnOnce() -> DbResult<DbPool>) -> DbResult<Database> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let pool = match build() {
        Ok(pool) => pool,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_pool_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };

    match bootstrap(&pool) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={} max_connections={}",
                started_at.elapsed().as_millis(),
                pool.max_size()
            );
            Ok(Database::from_pool(pool))
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap(pool: &DbPool) -> DbResult<()> {
    let mut conn = pool.get()?;
    ensure_schema(&mut conn)
}
