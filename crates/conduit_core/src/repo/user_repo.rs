//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Register users, mapping uniqueness violations to field-specific errors.
//! - Look users up through the predicate builder and attach follow data.
//! - Persist typed partial updates.
//!
//! # Invariants
//! - Duplicate email and duplicate username surface as distinct errors.
//! - Follow collections are supplementary: failing to load them leaves them
//!   empty instead of failing the lookup (cancellation still propagates).
//! - Updates rewrite every column in one statement.

use crate::db::{CancelToken, Database, TxScope};
use crate::model::user::{NewUser, User, UserFilter, UserId, UserPatch};
use crate::repo::error::unique_violation;
use crate::repo::hydrate::hydrate_user_best_effort;
use crate::repo::predicate::{limit_offset_sql, user_predicate};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, params_from_iter, Params, Row};

pub(crate) const USER_COLUMNS: &str =
    "id, email, username, bio, image, password_hash, created_at, updated_at";

const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

/// Repository interface for user persistence.
pub trait UserRepository {
    /// Inserts a user and returns the stored record.
    fn create(&self, cancel: &CancelToken, user: &NewUser) -> RepoResult<User>;
    /// Returns the first user matching `filter`, or `NotFound`.
    fn find_one(&self, cancel: &CancelToken, filter: &UserFilter) -> RepoResult<User>;
    /// Returns every user matching `filter`, ordered by id.
    fn find_many(&self, cancel: &CancelToken, filter: &UserFilter) -> RepoResult<Vec<User>>;
    /// Applies `patch` and persists the whole row. Returns the new `updated_at`.
    ///
    /// `user` is only modified when the write commits.
    fn update(&self, cancel: &CancelToken, user: &mut User, patch: &UserPatch) -> RepoResult<i64>;

    fn find_by_email(&self, cancel: &CancelToken, email: &str) -> RepoResult<User> {
        self.find_one(cancel, &UserFilter::by_email(email))
    }
}

/// SQLite-backed user repository.
#[derive(Clone)]
pub struct SqliteUserRepository {
    db: Database,
}

impl SqliteUserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl UserRepository for SqliteUserRepository {
    fn create(&self, cancel: &CancelToken, user: &NewUser) -> RepoResult<User> {
        self.db
            .write(cancel, "user_create", |scope| create_user(scope, user))
    }

    fn find_one(&self, cancel: &CancelToken, filter: &UserFilter) -> RepoResult<User> {
        self.db
            .read(cancel, "user_find_one", |scope| find_one_user(scope, filter))
    }

    fn find_many(&self, cancel: &CancelToken, filter: &UserFilter) -> RepoResult<Vec<User>> {
        self.db
            .read(cancel, "user_find_many", |scope| find_users(scope, filter))
    }

    fn update(&self, cancel: &CancelToken, user: &mut User, patch: &UserPatch) -> RepoResult<i64> {
        let mut patched = user.clone();
        patch.apply_to(&mut patched);

        let updated_at = self
            .db
            .write(cancel, "user_update", |scope| update_user(scope, &patched))?;

        patched.updated_at = updated_at;
        *user = patched;
        Ok(updated_at)
    }
}

fn create_user(scope: &TxScope<'_>, user: &NewUser) -> RepoResult<User> {
    let sql = format!(
        "INSERT INTO users (email, username, bio, image, password_hash)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING {USER_COLUMNS}"
    );
    let created = scope.query_row(
        &sql,
        params![
            user.email.as_str(),
            user.username.as_str(),
            user.bio.as_str(),
            user.image.as_str(),
            user.password_hash.as_str(),
        ],
        map_user_row,
    );

    created.map_err(|err| match unique_violation(&err) {
        Some("users.email") => RepoError::DuplicateEmail,
        Some("users.username") => RepoError::DuplicateUsername,
        _ => err,
    })
}

pub(crate) fn find_users(scope: &TxScope<'_>, filter: &UserFilter) -> RepoResult<Vec<User>> {
    let predicate = user_predicate(filter);
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users{} ORDER BY id ASC{}",
        predicate.where_sql(),
        limit_offset_sql(filter.limit, filter.offset)
    );

    let mut users = query_users(scope, &sql, params_from_iter(predicate.args()))?;
    for user in &mut users {
        hydrate_user_best_effort(scope, user)?;
    }
    Ok(users)
}

pub(crate) fn find_one_user(scope: &TxScope<'_>, filter: &UserFilter) -> RepoResult<User> {
    let first = UserFilter {
        limit: 1,
        ..filter.clone()
    };
    find_users(scope, &first)?
        .into_iter()
        .next()
        .ok_or(RepoError::NotFound("user"))
}

fn update_user(scope: &TxScope<'_>, user: &User) -> RepoResult<i64> {
    let sql = format!(
        "UPDATE users
         SET username = ?1, email = ?2, bio = ?3, image = ?4, password_hash = ?5,
             updated_at = MAX({NOW_MS_SQL}, updated_at + 1)
         WHERE id = ?6
         RETURNING updated_at"
    );
    let updated_at = scope.query_opt(
        &sql,
        params![
            user.username.as_str(),
            user.email.as_str(),
            user.bio.as_str(),
            user.image.as_str(),
            user.password_hash.as_str(),
            user.id,
        ],
        |row| row.get::<_, i64>(0),
    )?;

    updated_at.ok_or(RepoError::NotFound("user"))
}

/// Loads users by an arbitrary query returning [`USER_COLUMNS`].
///
/// Relationship collections are left empty.
pub(crate) fn query_users<P: Params>(
    scope: &TxScope<'_>,
    sql: &str,
    params: P,
) -> RepoResult<Vec<User>> {
    scope.query_all(sql, params, map_user_row)
}

pub(crate) fn find_user_by_id(scope: &TxScope<'_>, id: UserId) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    scope.query_opt(&sql, [id], map_user_row)
}

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        username: row.get("username")?,
        bio: row.get("bio")?,
        image: row.get("image")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        following: Vec::new(),
        followers: Vec::new(),
    })
}
