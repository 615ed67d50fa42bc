//! Tag model and lookup filter.

use serde::Serialize;

pub type TagId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    #[serde(skip)]
    pub id: TagId,
    /// Unique across all tags.
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub name: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl TagFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
