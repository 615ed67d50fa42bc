//! Association hydration for articles and users.
//!
//! # Responsibility
//! - Attach tags, author and favoriters to article rows.
//! - Attach follower/following collections to users.
//!
//! # Invariants
//! - Hydration only reads, inside the transaction of the primary fetch.
//! - A missing author is a data-integrity violation and fails the call.
//! - Collections are rebuilt from storage on every call.

use crate::db::TxScope;
use crate::model::article::{Article, ArticleId};
use crate::model::tag::Tag;
use crate::model::user::{User, UserId};
use crate::repo::article_repo::ArticleRow;
use crate::repo::tag_repo::map_tag_row;
use crate::repo::user_repo::{find_user_by_id, query_users, USER_COLUMNS};
use crate::repo::{RepoError, RepoResult};
use log::warn;

/// Builds a full [`Article`] from its stored row.
pub fn hydrate_article(scope: &TxScope<'_>, row: ArticleRow) -> RepoResult<Article> {
    let tags = article_tags(scope, row.id)?;

    let mut author = find_user_by_id(scope, row.author_id)?.ok_or(RepoError::NotFound("author"))?;
    hydrate_user_best_effort(scope, &mut author)?;

    let favorited_by = article_favoriters(scope, row.id)?;
    let favorites_count = i64::try_from(favorited_by.len())
        .map_err(|_| RepoError::InvalidData("favorite count overflow".to_string()))?;

    Ok(Article {
        id: row.id,
        title: row.title,
        body: row.body,
        description: row.description,
        slug: row.slug,
        author_id: row.author_id,
        author,
        tags,
        favorited_by,
        favorites_count,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Replaces `followers` and `following` of `user` with stored data.
pub fn hydrate_user(scope: &TxScope<'_>, user: &mut User) -> RepoResult<()> {
    user.followers = followers_of(scope, user.id)?;
    user.following = followed_by(scope, user.id)?;
    Ok(())
}

/// Like [`hydrate_user`], but a failure leaves both collections empty.
///
/// Cancellation still propagates.
pub(crate) fn hydrate_user_best_effort(scope: &TxScope<'_>, user: &mut User) -> RepoResult<()> {
    match hydrate_user(scope, user) {
        Ok(()) => Ok(()),
        Err(RepoError::Cancelled) => Err(RepoError::Cancelled),
        Err(err) => {
            warn!(
                "event=hydrate_user module=repo status=degraded op={} user_id={} error_code={}",
                scope.op(),
                user.id,
                err.code()
            );
            user.followers.clear();
            user.following.clear();
            Ok(())
        }
    }
}

fn article_tags(scope: &TxScope<'_>, article_id: ArticleId) -> RepoResult<Vec<Tag>> {
    scope.query_all(
        "SELECT id, name FROM tags WHERE id IN (
            SELECT tag_id FROM article_tags WHERE article_id = ?1
         ) ORDER BY id ASC",
        [article_id],
        map_tag_row,
    )
}

fn article_favoriters(scope: &TxScope<'_>, article_id: ArticleId) -> RepoResult<Vec<User>> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id IN (
            SELECT user_id FROM favorites WHERE article_id = ?1
         ) ORDER BY id ASC"
    );
    query_users(scope, &sql, [article_id])
}

fn followers_of(scope: &TxScope<'_>, user_id: UserId) -> RepoResult<Vec<User>> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id IN (
            SELECT follower_id FROM followings WHERE following_id = ?1
         ) ORDER BY id ASC"
    );
    query_users(scope, &sql, [user_id])
}

fn followed_by(scope: &TxScope<'_>, user_id: UserId) -> RepoResult<Vec<User>> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id IN (
            SELECT following_id FROM followings WHERE follower_id = ?1
         ) ORDER BY id ASC"
    );
    query_users(scope, &sql, [user_id])
}
