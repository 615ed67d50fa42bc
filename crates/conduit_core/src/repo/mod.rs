//! Repository layer: query construction, hydration and persistence.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for users, articles
//!   and tags.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every public repository call runs in exactly one transaction.
//! - Constraint violations are mapped to [`RepoError`] variants at this
//!   boundary; everything else surfaces as [`RepoError::Internal`].

pub mod article_repo;
pub mod error;
pub mod hydrate;
pub mod predicate;
pub mod tag_repo;
pub mod user_repo;

pub use error::{RepoError, RepoResult};
