//! User use-case service.
//!
//! # Invariants
//! - `authenticate` never reveals whether the email exists.
//! - Password hashing is not done here; the stored hash is only handed to a
//!   [`CredentialVerifier`].

use crate::db::CancelToken;
use crate::model::user::{NewUser, User, UserPatch};
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;

/// Checks a plain-text password against a stored credential hash.
pub trait CredentialVerifier {
    fn verify(&self, password_hash: &str, password: &str) -> bool;
}

impl<F> CredentialVerifier for F
where
    F: Fn(&str, &str) -> bool,
{
    fn verify(&self, password_hash: &str, password: &str) -> bool {
        self(password_hash, password)
    }
}

/// Use-case service for account operations.
pub struct UserService<R: UserRepository, V: CredentialVerifier> {
    repo: R,
    verifier: V,
}

impl<R: UserRepository, V: CredentialVerifier> UserService<R, V> {
    pub fn new(repo: R, verifier: V) -> Self {
        Self { repo, verifier }
    }

    /// Registers a user. Fails with `DuplicateEmail` / `DuplicateUsername`.
    pub fn register(&self, cancel: &CancelToken, user: &NewUser) -> RepoResult<User> {
        self.repo.create(cancel, user)
    }

    pub fn user_by_email(&self, cancel: &CancelToken, email: &str) -> RepoResult<User> {
        self.repo.find_by_email(cancel, email)
    }

    /// Returns the user owning `email` when `password` verifies.
    ///
    /// Unknown email and wrong password both yield `Unauthorized`.
    pub fn authenticate(
        &self,
        cancel: &CancelToken,
        email: &str,
        password: &str,
    ) -> RepoResult<User> {
        let user = match self.repo.find_by_email(cancel, email) {
            Ok(user) => user,
            Err(RepoError::NotFound(_)) => return Err(self.reject()),
            Err(err) => return Err(err),
        };

        if self.verifier.verify(&user.password_hash, password) {
            Ok(user)
        } else {
            Err(self.reject())
        }
    }

    /// Applies `patch` to `user` and persists it. Returns the new `updated_at`.
    pub fn update_user(
        &self,
        cancel: &CancelToken,
        user: &mut User,
        patch: &UserPatch,
    ) -> RepoResult<i64> {
        self.repo.update(cancel, user, patch)
    }

    fn reject(&self) -> RepoError {
        info!("event=authenticate module=service status=rejected");
        RepoError::Unauthorized
    }
}
