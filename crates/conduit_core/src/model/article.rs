//! Article model, creation input, lookup filter and slug derivation.
//!
//! # Invariants
//! - An article has exactly one author, fixed at creation.
//! - `favorites_count == favorited_by.len()` for every hydrated article.
//! - Tags are ordered by tag id ascending.

use crate::model::tag::Tag;
use crate::model::user::{User, UserId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub type ArticleId = i64;

const FALLBACK_SLUG: &str = "article";

static NON_SLUG_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

/// Fully hydrated article as returned by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    #[serde(skip)]
    pub id: ArticleId,
    pub title: String,
    pub body: String,
    pub description: String,
    pub slug: String,
    #[serde(skip)]
    pub author_id: UserId,
    #[serde(skip)]
    pub author: User,
    pub tags: Vec<Tag>,
    #[serde(skip)]
    pub favorited_by: Vec<User>,
    pub favorites_count: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Article {
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.name.clone()).collect()
    }

    /// Returns whether the user with `user_id` favorited this article.
    pub fn is_favorited_by(&self, user_id: UserId) -> bool {
        self.favorited_by.iter().any(|user| user.id == user_id)
    }
}

/// Input for article creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewArticle {
    pub author_id: UserId,
    pub title: String,
    pub body: String,
    pub description: String,
    pub slug: String,
    /// Tag names in display order. Repeated names are linked once.
    pub tags: Vec<String>,
}

impl NewArticle {
    /// Builds a creation input whose slug is derived from `title`.
    pub fn new(author_id: UserId, title: impl Into<String>, body: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            author_id,
            slug: slugify(&title),
            title,
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// Sparse article lookup. Matching fields are combined with `AND`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub id: Option<ArticleId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author_id: Option<UserId>,
    /// Articles written by the user with this username.
    pub author_username: Option<String>,
    /// Articles carrying the tag with this name.
    pub tag: Option<String>,
    pub slug: Option<String>,
    /// Articles favorited by the user with this username.
    pub favorited_by: Option<String>,
    /// Zero or negative means no limit.
    pub limit: i64,
    /// Negative is treated as zero.
    pub offset: i64,
}

/// Derives a URL-safe slug from an article title.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into one
/// `-`, and trims leading/trailing dashes.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = NON_SLUG_CHARS_RE.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{slugify, NewArticle};

    #[test]
    fn slugify_collapses_separators_and_trims() {
        assert_eq!(slugify("How to train your dragon"), "how-to-train-your-dragon");
        assert_eq!(slugify("  Rust & Go: 2 languages!  "), "rust-go-2-languages");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn slugify_falls_back_when_nothing_is_left() {
        assert_eq!(slugify("!!!"), "article");
        assert_eq!(slugify(""), "article");
    }

    #[test]
    fn new_article_derives_slug_and_collects_tags() {
        let input = NewArticle::new(3, "Hello World", "body")
            .with_description("greeting")
            .with_tags(["go", "rust"]);

        assert_eq!(input.slug, "hello-world");
        assert_eq!(input.author_id, 3);
        assert_eq!(input.description, "greeting");
        assert_eq!(input.tags, vec!["go".to_string(), "rust".to_string()]);
    }
}
