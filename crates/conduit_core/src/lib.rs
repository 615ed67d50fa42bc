//! Data-access core for the Conduit social-blogging backend.
//! This crate is the single source of truth for persistence invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, CancelToken, Database, DbConfig, DbError, TxScope};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::article::{slugify, Article, ArticleFilter, ArticleId, NewArticle};
pub use model::tag::{Tag, TagFilter, TagId};
pub use model::user::{NewUser, User, UserFilter, UserId, UserPatch};
pub use model::view::{ArticleView, Profile};
pub use repo::article_repo::{ArticleRepository, SqliteArticleRepository};
pub use repo::tag_repo::{resolve_tag, SqliteTagRepository, TagRepository, TagResolution};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::article_service::{ArticleService, NewArticleInput};
pub use service::user_service::{CredentialVerifier, UserService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
