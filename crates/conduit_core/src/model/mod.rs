//! Domain model for users, articles and tags.
//!
//! # Responsibility
//! - Define the records returned by repositories and the filter/patch inputs
//!   they accept.
//! - Provide the viewer-dependent projections handed to presentation layers.
//!
//! # Invariants
//! - Ids are assigned by the store and never change.
//! - Relationship collections (`followers`, `favorited_by`, ...) are rebuilt
//!   on every read and never written back.
//! - Every filter field is optional; an absent field means "no constraint".

pub mod article;
pub mod tag;
pub mod user;
pub mod view;
