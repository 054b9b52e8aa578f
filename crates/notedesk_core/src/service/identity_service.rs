//! Request-scoped identity resolution.
//!
//! # Responsibility
//! - Sign up and log in local users; upsert third-party users on login.
//! - Issue, resolve and revoke opaque session tokens.
//!
//! # Invariants
//! - Every strategy resolves to a plain `UserId` before note access.
//! - Passwords are stored only as salted SHA-256 digests.
//! - Session tokens and passwords are never logged.

use crate::model::note::{now_epoch_ms, UserId};
use crate::model::user::{AuthStrategy, Provider, User};
use crate::repo::user_repo::SqliteUserRepository;
use crate::repo::RepoError;
use log::{info, warn};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Failure of an identity operation.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{field} must not be empty")]
    Validation { field: &'static str },
    #[error("username `{0}` is already taken")]
    UsernameTaken(String),
    #[error("wrong username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Source of the current user for an inbound request.
pub trait IdentityProvider {
    /// Resolves a session token to the authenticated user id, if any.
    fn current_user_id(&self, session_id: Option<&str>) -> Result<Option<UserId>, IdentityError>;
}

/// Result of a successful login or signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub user: User,
    pub session_id: String,
}

/// Identity service over the users/sessions store.
pub struct IdentityService<'conn> {
    repo: SqliteUserRepository<'conn>,
}

impl<'conn> IdentityService<'conn> {
    pub fn new(repo: SqliteUserRepository<'conn>) -> Self {
        Self { repo }
    }

    /// Registers a local user and opens a session for it.
    pub fn signup_local(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Authenticated, IdentityError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(IdentityError::Validation { field: "username" });
        }
        if password.is_empty() {
            return Err(IdentityError::Validation { field: "password" });
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            strategy: AuthStrategy::Local,
            username: username.to_string(),
            avatar_url: None,
            created_at: now_epoch_ms(),
        };
        let salt = Uuid::new_v4().simple().to_string();
        let digest = hash_password(&salt, password);
        if !self.repo.insert_local_user(&user, &digest, &salt)? {
            return Err(IdentityError::UsernameTaken(username.to_string()));
        }

        info!("event=user_signup module=identity status=ok strategy=local user_id={}", user.id);
        self.open_session(user)
    }

    /// Verifies local credentials and opens a session.
    pub fn login_local(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Authenticated, IdentityError> {
        let Some(credentials) = self.repo.find_local_credentials(username.trim())? else {
            warn!("event=user_login module=identity status=error strategy=local error_code=unknown_user");
            return Err(IdentityError::InvalidCredentials);
        };
        if hash_password(&credentials.password_salt, password) != credentials.password_hash {
            warn!(
                "event=user_login module=identity status=error strategy=local error_code=wrong_password user_id={}",
                credentials.user.id
            );
            return Err(IdentityError::InvalidCredentials);
        }

        info!(
            "event=user_login module=identity status=ok strategy=local user_id={}",
            credentials.user.id
        );
        self.open_session(credentials.user)
    }

    /// Logs in a third-party user, creating it on first sight.
    pub fn login_third_party(
        &self,
        provider: Provider,
        external_id: &str,
        username: &str,
        avatar_url: Option<&str>,
    ) -> Result<Authenticated, IdentityError> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(IdentityError::Validation {
                field: "external_id",
            });
        }

        let user = match self.repo.find_third_party(provider, external_id)? {
            Some(mut existing) => {
                self.repo.update_profile(&existing.id, username, avatar_url)?;
                existing.username = username.to_string();
                existing.avatar_url = avatar_url.map(str::to_string);
                existing
            }
            None => {
                let created = User {
                    id: Uuid::new_v4().to_string(),
                    strategy: AuthStrategy::ThirdParty(provider),
                    username: username.to_string(),
                    avatar_url: avatar_url.map(str::to_string),
                    created_at: now_epoch_ms(),
                };
                self.repo.insert_third_party(&created, provider, external_id)?;
                info!(
                    "event=user_signup module=identity status=ok strategy=third_party provider={} user_id={}",
                    provider, created.id
                );
                created
            }
        };

        self.open_session(user)
    }

    /// Revokes a session token. Returns whether it was active.
    pub fn logout(&self, session_id: &str) -> Result<bool, IdentityError> {
        let removed = self.repo.delete_session(session_id)?;
        info!("event=user_logout module=identity status=ok removed={removed}");
        Ok(removed)
    }

    /// Loads the profile behind a session token.
    pub fn current_user(&self, session_id: Option<&str>) -> Result<Option<User>, IdentityError> {
        match self.current_user_id(session_id)? {
            Some(user_id) => Ok(self.repo.get_user(&user_id)?),
            None => Ok(None),
        }
    }

    fn open_session(&self, user: User) -> Result<Authenticated, IdentityError> {
        let session_id = Uuid::new_v4().simple().to_string();
        self.repo
            .insert_session(&session_id, &user.id, now_epoch_ms())?;
        Ok(Authenticated { user, session_id })
    }
}

impl IdentityProvider for IdentityService<'_> {
    fn current_user_id(&self, session_id: Option<&str>) -> Result<Option<UserId>, IdentityError> {
        match session_id.map(str::trim) {
            Some(token) if !token.is_empty() => Ok(self.repo.find_session_user(token)?),
            _ => Ok(None),
        }
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::hash_password;

    #[test]
    fn hash_depends_on_salt_and_password() {
        let base = hash_password("salt-a", "secret");
        assert_eq!(base.len(), 64);
        assert_eq!(base, hash_password("salt-a", "secret"));
        assert_ne!(base, hash_password("salt-b", "secret"));
        assert_ne!(base, hash_password("salt-a", "secret2"));
    }
}
