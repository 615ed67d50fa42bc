//! Viewer-dependent projections handed to presentation layers.
//!
//! The viewer is explicit: `None` means nobody is signed in.

use crate::model::article::Article;
use crate::model::user::User;
use serde::Serialize;

/// Public face of a user as seen by a (possibly anonymous) viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub username: String,
    pub bio: String,
    pub image: String,
    /// Whether the viewer follows this user. Always false for anonymous viewers.
    pub following: bool,
}

impl Profile {
    pub fn of(user: &User, viewer: Option<&User>) -> Self {
        let following = viewer.is_some_and(|viewer| {
            user.is_followed_by(viewer.id) || viewer.is_following(user.id)
        });
        Self {
            username: user.username.clone(),
            bio: user.bio.clone(),
            image: user.image.clone(),
            following,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub favorited: bool,
    pub favorites_count: i64,
    pub author: Profile,
}

impl ArticleView {
    pub fn of(article: &Article, viewer: Option<&User>) -> Self {
        Self {
            slug: article.slug.clone(),
            title: article.title.clone(),
            description: article.description.clone(),
            body: article.body.clone(),
            tag_list: article.tag_names(),
            created_at: article.created_at,
            updated_at: article.updated_at,
            favorited: viewer.is_some_and(|viewer| article.is_favorited_by(viewer.id)),
            favorites_count: article.favorites_count,
            author: Profile::of(&article.author, viewer),
        }
    }
}
