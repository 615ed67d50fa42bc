//! Filter-to-SQL predicate construction.
//!
//! # Responsibility
//! - Turn sparse filter structs into `WHERE` clauses with positional `?N`
//!   parameters and a matching argument list.
//! - Render the independent `LIMIT`/`OFFSET` tail.
//!
//! # Invariants
//! - Clause *i* references argument *i* (`?i`, 1-based).
//! - Filter fields are visited in a fixed order: id, foreign keys,
//!   lookup columns, then derived subquery fields.
//! - Derived fields use `IN (subquery)` or scalar-subquery forms, never joins.
//! - No active field means no `WHERE` clause.

use crate::model::article::ArticleFilter;
use crate::model::tag::TagFilter;
use crate::model::user::UserFilter;
use rusqlite::types::Value;

/// Ordered clauses plus the positional arguments they reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<String>,
    args: Vec<Value>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `column = ?N`.
    pub fn push_eq(&mut self, column: &str, value: impl Into<Value>) {
        self.clause(|param| format!("{column} = {param}"), value);
    }

    /// Adds the clause produced by `render`, which receives the placeholder
    /// (`?N`) bound to `value`.
    pub fn clause(&mut self, render: impl FnOnce(&str) -> String, value: impl Into<Value>) {
        let param = format!("?{}", self.args.len() + 1);
        self.clauses.push(render(&param));
        self.args.push(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Renders ` WHERE a AND b ...`, or an empty string without clauses.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

/// Appends the article filter clauses after any existing ones.
pub fn push_article_filter(predicate: &mut Predicate, filter: &ArticleFilter) {
    if let Some(id) = filter.id {
        predicate.push_eq("id", id);
    }
    if let Some(author_id) = filter.author_id {
        predicate.push_eq("author_id", author_id);
    }
    if let Some(slug) = &filter.slug {
        predicate.push_eq("slug", slug.clone());
    }
    if let Some(title) = &filter.title {
        predicate.push_eq("title", title.clone());
    }
    if let Some(description) = &filter.description {
        predicate.push_eq("description", description.clone());
    }
    if let Some(tag) = &filter.tag {
        predicate.clause(
            |param| {
                format!(
                    "id IN (SELECT article_id FROM article_tags WHERE tag_id IN (SELECT id FROM tags WHERE name = {param}))"
                )
            },
            tag.clone(),
        );
    }
    if let Some(username) = &filter.author_username {
        predicate.clause(
            |param| format!("author_id = (SELECT id FROM users WHERE username = {param})"),
            username.clone(),
        );
    }
    if let Some(username) = &filter.favorited_by {
        predicate.clause(
            |param| {
                format!(
                    "id IN (SELECT article_id FROM favorites WHERE user_id = (SELECT id FROM users WHERE username = {param} LIMIT 1))"
                )
            },
            username.clone(),
        );
    }
}

pub fn article_predicate(filter: &ArticleFilter) -> Predicate {
    let mut predicate = Predicate::new();
    push_article_filter(&mut predicate, filter);
    predicate
}

pub fn user_predicate(filter: &UserFilter) -> Predicate {
    let mut predicate = Predicate::new();
    if let Some(id) = filter.id {
        predicate.push_eq("id", id);
    }
    if let Some(email) = &filter.email {
        predicate.push_eq("email", email.clone());
    }
    if let Some(username) = &filter.username {
        predicate.push_eq("username", username.clone());
    }
    predicate
}

pub fn tag_predicate(filter: &TagFilter) -> Predicate {
    let mut predicate = Predicate::new();
    if let Some(name) = &filter.name {
        predicate.push_eq("name", name.clone());
    }
    predicate
}

/// Renders the `LIMIT`/`OFFSET` tail.
///
/// Negative values clamp to zero; a zero limit means no limit. SQLite needs a
/// `LIMIT` before `OFFSET`, so an offset alone renders `LIMIT -1`.
pub fn limit_offset_sql(limit: i64, offset: i64) -> String {
    let limit = limit.max(0);
    let offset = offset.max(0);
    match (limit, offset) {
        (0, 0) => String::new(),
        (0, offset) => format!(" LIMIT -1 OFFSET {offset}"),
        (limit, 0) => format!(" LIMIT {limit}"),
        (limit, offset) => format!(" LIMIT {limit} OFFSET {offset}"),
    }
}
