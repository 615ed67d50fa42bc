//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the capabilities presentation layers
//!   consume (registration, login, article publishing, listings, feed).
//! - Keep HTTP/UI layers decoupled from storage details.

pub mod article_service;
pub mod user_service;
