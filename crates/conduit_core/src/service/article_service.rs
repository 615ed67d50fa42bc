//! Article use-case service.
//!
//! # Invariants
//! - Slugs are always derived from the title.
//! - The feed requires a signed-in viewer.

use crate::db::CancelToken;
use crate::model::article::{Article, ArticleFilter, NewArticle};
use crate::model::user::User;
use crate::model::view::ArticleView;
use crate::repo::article_repo::ArticleRepository;
use crate::repo::{RepoError, RepoResult};

/// Caller-supplied fields of a new article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewArticleInput {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tags: Vec<String>,
}

/// Use-case service for publishing and reading articles.
pub struct ArticleService<R: ArticleRepository> {
    repo: R,
}

impl<R: ArticleRepository> ArticleService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Publishes an article written by `author`.
    pub fn create_article(
        &self,
        cancel: &CancelToken,
        author: &User,
        input: NewArticleInput,
    ) -> RepoResult<Article> {
        let article = NewArticle::new(author.id, input.title, input.body)
            .with_description(input.description)
            .with_tags(input.tags);
        self.repo.create(cancel, &article)
    }

    pub fn list_articles(
        &self,
        cancel: &CancelToken,
        filter: &ArticleFilter,
    ) -> RepoResult<Vec<Article>> {
        self.repo.find(cancel, filter)
    }

    /// Returns the newest article with `slug`.
    pub fn article_by_slug(&self, cancel: &CancelToken, slug: &str) -> RepoResult<Article> {
        let filter = ArticleFilter {
            slug: Some(slug.to_string()),
            limit: 1,
            ..ArticleFilter::default()
        };
        self.repo
            .find(cancel, &filter)?
            .into_iter()
            .next()
            .ok_or(RepoError::NotFound("article"))
    }

    /// Articles by authors the viewer follows. Anonymous viewers are rejected.
    pub fn feed(
        &self,
        cancel: &CancelToken,
        viewer: Option<&User>,
        filter: &ArticleFilter,
    ) -> RepoResult<Vec<Article>> {
        let viewer = viewer.ok_or(RepoError::Unauthorized)?;
        self.repo.find_feed(cancel, viewer, filter)
    }

    /// Projects articles for `viewer` (`None` = anonymous).
    pub fn present(&self, articles: &[Article], viewer: Option<&User>) -> Vec<ArticleView> {
        articles
            .iter()
            .map(|article| ArticleView::of(article, viewer))
            .collect()
    }
}
