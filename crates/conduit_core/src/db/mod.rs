//! SQLite storage bootstrap, connection pooling and transaction scopes.
//!
//! # Responsibility
//! - Build the shared connection pool and configure every pooled connection.
//! - Create the relational schema before any data access happens.
//! - Provide the transaction coordinator used by every repository call.
//!
//! # Invariants
//! - Pooled connections have `foreign_keys=ON` and a busy timeout.
//! - The schema version is tracked via `PRAGMA user_version`.
//! - The pool is the only shared resource; one transaction owns one
//!   connection until it commits or rolls back.

use r2d2_sqlite::SqliteConnectionManager;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod config;
mod open;
pub mod schema;
mod tx;

pub use config::DbConfig;
pub use open::{open_db, open_db_in_memory};
pub use tx::{CancelToken, TxScope};

pub type DbResult<T> = Result<T, DbError>;

/// Pool of SQLite connections shared by every repository.
pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Pool(r2d2::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Pool(err) => write!(f, "connection pool: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Pool(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<r2d2::Error> for DbError {
    fn from(value: r2d2::Error) -> Self {
        Self::Pool(value)
    }
}

/// Handle to an opened, schema-ready database.
///
/// Cloning is cheap: clones share the same pool.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    pub(crate) fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Number of connections currently held by the pool (idle or checked out).
    pub fn pooled_connections(&self) -> u32 {
        self.pool.state().connections
    }
}
