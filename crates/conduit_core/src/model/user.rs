//! User model, lookup filter and partial update.

use serde::Serialize;

pub type UserId = i64;

/// Stored user plus its follow relationships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct User {
    #[serde(skip)]
    pub id: UserId,
    /// Globally unique.
    pub email: String,
    /// Globally unique.
    pub username: String,
    pub bio: String,
    pub image: String,
    /// Opaque credential hash. Only a `CredentialVerifier` interprets it.
    #[serde(skip)]
    pub password_hash: String,
    /// Unix epoch milliseconds.
    #[serde(skip)]
    pub created_at: i64,
    /// Unix epoch milliseconds.
    #[serde(skip)]
    pub updated_at: i64,
    /// Users this user follows.
    #[serde(skip)]
    pub following: Vec<User>,
    /// Users following this user.
    #[serde(skip)]
    pub followers: Vec<User>,
}

impl User {
    /// Returns whether this user follows the user with `other_id`.
    pub fn is_following(&self, other_id: UserId) -> bool {
        self.following.iter().any(|user| user.id == other_id)
    }

    /// Returns whether the user with `other_id` follows this user.
    pub fn is_followed_by(&self, other_id: UserId) -> bool {
        self.followers.iter().any(|user| user.id == other_id)
    }
}

/// Input for user registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub bio: String,
    pub image: String,
    pub password_hash: String,
}

/// Sparse user lookup. Matching fields are combined with `AND`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub id: Option<UserId>,
    pub email: Option<String>,
    pub username: Option<String>,
    /// Zero or negative means no limit.
    pub limit: i64,
    /// Negative is treated as zero.
    pub offset: i64,
}

impl UserFilter {
    pub fn by_id(id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    pub fn by_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }
}

/// Partial user update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub password_hash: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.image.is_none()
            && self.bio.is_none()
            && self.password_hash.is_none()
    }

    /// Copies every present field onto `user`.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        if let Some(username) = &self.username {
            user.username.clone_from(username);
        }
        if let Some(image) = &self.image {
            user.image.clone_from(image);
        }
        if let Some(bio) = &self.bio {
            user.bio.clone_from(bio);
        }
        if let Some(password_hash) = &self.password_hash {
            user.password_hash.clone_from(password_hash);
        }
    }
}
