//! Tag lookup and resolve-or-create.
//!
//! # Responsibility
//! - Map tag names to tag records, creating missing tags inside the caller's
//!   write transaction.
//! - Serve the read-only tag listing.
//!
//! # Invariants
//! - Tag names are unique; resolving an existing name never creates a row.
//! - A unique violation on insert means another writer created the tag first
//!   and resolves to the stored row. Write transactions start `IMMEDIATE`, so
//!   the lookup and the insert already hold the write lock together; the
//!   fallback only matters if tags are ever resolved outside such a
//!   transaction.
//! - Tags are never updated or deleted here.

use crate::db::{CancelToken, Database, TxScope};
use crate::model::tag::{Tag, TagFilter};
use crate::repo::error::unique_violation;
use crate::repo::predicate::{limit_offset_sql, tag_predicate};
use crate::repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{params_from_iter, Row};

/// Outcome of [`resolve_tag`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagResolution {
    /// The tag already existed.
    Found(Tag),
    /// The tag was inserted by this call.
    Created(Tag),
}

impl TagResolution {
    pub fn tag(&self) -> &Tag {
        match self {
            Self::Found(tag) | Self::Created(tag) => tag,
        }
    }

    pub fn into_tag(self) -> Tag {
        match self {
            Self::Found(tag) | Self::Created(tag) => tag,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Returns the tag named `name`, inserting it when missing.
pub fn resolve_tag(scope: &TxScope<'_>, name: &str) -> RepoResult<TagResolution> {
    if let Some(tag) = find_tag_by_name(scope, name)? {
        return Ok(TagResolution::Found(tag));
    }

    let inserted = scope.query_row(
        "INSERT INTO tags (name) VALUES (?1) RETURNING id, name",
        [name],
        map_tag_row,
    );

    match inserted {
        Ok(tag) => Ok(TagResolution::Created(tag)),
        Err(err) if unique_violation(&err) == Some("tags.name") => {
            debug!(
                "event=tag_resolve module=repo status=conflict op={} outcome=found",
                scope.op()
            );
            find_tag_by_name(scope, name)?
                .map(TagResolution::Found)
                .ok_or(RepoError::NotFound("tag"))
        }
        Err(err) => Err(err),
    }
}

pub(crate) fn find_tags(scope: &TxScope<'_>, filter: &TagFilter) -> RepoResult<Vec<Tag>> {
    let predicate = tag_predicate(filter);
    let sql = format!(
        "SELECT id, name FROM tags{} ORDER BY id ASC{}",
        predicate.where_sql(),
        limit_offset_sql(filter.limit, filter.offset)
    );
    scope.query_all(&sql, params_from_iter(predicate.args()), map_tag_row)
}

pub(crate) fn find_tag_by_name(scope: &TxScope<'_>, name: &str) -> RepoResult<Option<Tag>> {
    Ok(find_tags(scope, &TagFilter::by_name(name))?.into_iter().next())
}

pub(crate) fn map_tag_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

/// Read paths for tags. Tags are only created through article creation.
pub trait TagRepository {
    fn find_by_name(&self, cancel: &CancelToken, name: &str) -> RepoResult<Tag>;
    fn list(&self, cancel: &CancelToken, filter: &TagFilter) -> RepoResult<Vec<Tag>>;
}

pub struct SqliteTagRepository {
    db: Database,
}

impl SqliteTagRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl TagRepository for SqliteTagRepository {
    fn find_by_name(&self, cancel: &CancelToken, name: &str) -> RepoResult<Tag> {
        self.db.read(cancel, "tag_find_by_name", |scope| {
            find_tag_by_name(scope, name)?.ok_or(RepoError::NotFound("tag"))
        })
    }

    fn list(&self, cancel: &CancelToken, filter: &TagFilter) -> RepoResult<Vec<Tag>> {
        self.db
            .read(cancel, "tag_list", |scope| find_tags(scope, filter))
    }
}
