//! Data-access error taxonomy.

use crate::db::DbError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by every repository and service operation.
#[derive(Debug)]
pub enum RepoError {
    /// A lookup that expected one row found none. Carries the entity kind.
    NotFound(&'static str),
    DuplicateEmail,
    DuplicateUsername,
    /// Failed credential check. Unknown email and wrong password look the same.
    Unauthorized,
    /// The caller cancelled before commit; the transaction was rolled back.
    Cancelled,
    /// A persisted row violates a model invariant.
    InvalidData(String),
    /// Unexpected storage or transport failure.
    Internal(DbError),
}

impl RepoError {
    /// Stable error code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::DuplicateEmail => "duplicate_email",
            Self::DuplicateUsername => "duplicate_username",
            Self::Unauthorized => "unauthorized",
            Self::Cancelled => "cancelled",
            Self::InvalidData(_) => "invalid_data",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the caller can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::DuplicateEmail | Self::DuplicateUsername | Self::Unauthorized
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::DuplicateEmail => write!(f, "duplicate email"),
            Self::DuplicateUsername => write!(f, "duplicate username"),
            Self::Unauthorized => write!(f, "invalid credentials"),
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Internal(err) => write!(f, "internal storage error: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Internal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::Internal(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if value.sqlite_error_code() == Some(ErrorCode::OperationInterrupted) {
            return Self::Cancelled;
        }
        Self::Internal(DbError::Sqlite(value))
    }
}

impl From<r2d2::Error> for RepoError {
    fn from(value: r2d2::Error) -> Self {
        Self::Internal(DbError::Pool(value))
    }
}

/// Returns the `table.column` list of a failed UNIQUE constraint, if any.
///
/// SQLite reports these as `UNIQUE constraint failed: users.email`.
pub(crate) fn unique_violation(err: &RepoError) -> Option<&str> {
    match err {
        RepoError::Internal(DbError::Sqlite(rusqlite::Error::SqliteFailure(failure, Some(message))))
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            message.strip_prefix("UNIQUE constraint failed: ")
        }
        _ => None,
    }
}
