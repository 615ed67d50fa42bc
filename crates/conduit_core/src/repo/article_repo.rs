//! Article repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Create articles together with their tag links in one transaction.
//! - Serve filtered listings and the personal feed, fully hydrated.
//!
//! # Invariants
//! - Article creation is all-or-nothing: an article is never partially tagged.
//! - Listings are ordered by `created_at DESC, id DESC`.
//! - Every returned article is hydrated; one failing row fails the call.

use crate::db::{CancelToken, Database, TxScope};
use crate::model::article::{Article, ArticleFilter, ArticleId, NewArticle};
use crate::model::tag::TagId;
use crate::model::user::{User, UserId};
use crate::repo::hydrate::hydrate_article;
use crate::repo::predicate::{article_predicate, limit_offset_sql, push_article_filter, Predicate};
use crate::repo::tag_repo::resolve_tag;
use crate::repo::RepoResult;
use rusqlite::{params, params_from_iter, Row};
use std::collections::HashSet;

const ARTICLE_COLUMNS: &str =
    "id, title, body, description, slug, author_id, created_at, updated_at";

/// Stored article columns before hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRow {
    pub id: ArticleId,
    pub title: String,
    pub body: String,
    pub description: String,
    pub slug: String,
    pub author_id: UserId,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Repository interface for article persistence.
pub trait ArticleRepository {
    /// Inserts the article and links its tags. Returns the hydrated article.
    fn create(&self, cancel: &CancelToken, article: &NewArticle) -> RepoResult<Article>;
    /// Lists articles matching `filter`, newest first.
    fn find(&self, cancel: &CancelToken, filter: &ArticleFilter) -> RepoResult<Vec<Article>>;
    /// Lists articles written by users that `user` follows, newest first.
    fn find_feed(
        &self,
        cancel: &CancelToken,
        user: &User,
        filter: &ArticleFilter,
    ) -> RepoResult<Vec<Article>>;
}

/// SQLite-backed article repository.
#[derive(Clone)]
pub struct SqliteArticleRepository {
    db: Database,
}

impl SqliteArticleRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl ArticleRepository for SqliteArticleRepository {
    fn create(&self, cancel: &CancelToken, article: &NewArticle) -> RepoResult<Article> {
        self.db
            .write(cancel, "article_create", |scope| create_article(scope, article))
    }

    fn find(&self, cancel: &CancelToken, filter: &ArticleFilter) -> RepoResult<Vec<Article>> {
        self.db
            .read(cancel, "article_find", |scope| find_articles(scope, filter))
    }

    fn find_feed(
        &self,
        cancel: &CancelToken,
        user: &User,
        filter: &ArticleFilter,
    ) -> RepoResult<Vec<Article>> {
        self.db.read(cancel, "article_feed", |scope| {
            find_feed_articles(scope, user.id, filter)
        })
    }
}

/// Inserts the article row, then resolves and links every tag in input order.
pub fn create_article(scope: &TxScope<'_>, article: &NewArticle) -> RepoResult<Article> {
    let sql = format!(
        "INSERT INTO articles (title, body, description, author_id, slug)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING {ARTICLE_COLUMNS}"
    );
    let row = scope.query_row(
        &sql,
        params![
            article.title.as_str(),
            article.body.as_str(),
            article.description.as_str(),
            article.author_id,
            article.slug.as_str(),
        ],
        map_article_row,
    )?;

    set_article_tags(scope, row.id, &article.tags)?;
    hydrate_article(scope, row)
}

fn set_article_tags(scope: &TxScope<'_>, article_id: ArticleId, names: &[String]) -> RepoResult<()> {
    let mut linked = HashSet::new();
    for name in names {
        if !linked.insert(name.as_str()) {
            continue;
        }
        let tag = resolve_tag(scope, name)?.into_tag();
        link_tag(scope, article_id, tag.id)?;
    }
    Ok(())
}

fn link_tag(scope: &TxScope<'_>, article_id: ArticleId, tag_id: TagId) -> RepoResult<()> {
    scope.execute(
        "INSERT INTO article_tags (article_id, tag_id) VALUES (?1, ?2)",
        [article_id, tag_id],
    )?;
    Ok(())
}

pub(crate) fn find_articles(scope: &TxScope<'_>, filter: &ArticleFilter) -> RepoResult<Vec<Article>> {
    query_articles(scope, &article_predicate(filter), filter)
}

fn find_feed_articles(
    scope: &TxScope<'_>,
    follower_id: UserId,
    filter: &ArticleFilter,
) -> RepoResult<Vec<Article>> {
    let mut predicate = Predicate::new();
    predicate.clause(
        |param| {
            format!("author_id IN (SELECT following_id FROM followings WHERE follower_id = {param})")
        },
        follower_id,
    );
    push_article_filter(&mut predicate, filter);
    query_articles(scope, &predicate, filter)
}

fn query_articles(
    scope: &TxScope<'_>,
    predicate: &Predicate,
    filter: &ArticleFilter,
) -> RepoResult<Vec<Article>> {
    let sql = format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles{} ORDER BY created_at DESC, id DESC{}",
        predicate.where_sql(),
        limit_offset_sql(filter.limit, filter.offset)
    );
    let rows = scope.query_all(&sql, params_from_iter(predicate.args()), map_article_row)?;
    rows.into_iter()
        .map(|row| hydrate_article(scope, row))
        .collect()
}

fn map_article_row(row: &Row<'_>) -> rusqlite::Result<ArticleRow> {
    Ok(ArticleRow {
        id: row.get("id")?,
        title: row.get("title")?,
        body: row.get("body")?,
        description: row.get("description")?,
        slug: row.get("slug")?,
        author_id: row.get("author_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
