//! User and session persistence.
//!
//! # Responsibility
//! - Store local and third-party users in one `users` table.
//! - Store opaque session tokens mapped to canonical user ids.
//!
//! # Invariants
//! - Password material is only read by `find_local_credentials`.
//! - Deleting a user cascades to its sessions.

use crate::model::note::UserId;
use crate::model::user::{AuthStrategy, Provider, User};
use crate::repo::{ensure_table_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

const USER_COLUMNS: &str = "id, strategy, provider, username, avatar_url, created_at";

/// Salted password hash stored for a local user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCredentials {
    pub user: User,
    pub password_hash: String,
    pub password_salt: String,
}

/// SQLite-backed user and session repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "users",
            &[
                "id",
                "strategy",
                "provider",
                "external_id",
                "username",
                "password_hash",
                "password_salt",
            ],
        )?;
        ensure_table_ready(conn, "sessions", &["session_id", "user_id", "created_at"])?;
        Ok(Self { conn })
    }

    /// Inserts a local user. Returns `Ok(false)` when the username is taken.
    pub fn insert_local_user(
        &self,
        user: &User,
        password_hash: &str,
        password_salt: &str,
    ) -> RepoResult<bool> {
        let result = self.conn.execute(
            "INSERT INTO users (
                id,
                strategy,
                username,
                password_hash,
                password_salt,
                created_at
            ) VALUES (?1, 'local', ?2, ?3, ?4, ?5);",
            params![
                user.id.as_str(),
                user.username.as_str(),
                password_hash,
                password_salt,
                user.created_at,
            ],
        );
        match result {
            Ok(_) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Looks up a local user and its password material by username.
    pub fn find_local_credentials(&self, username: &str) -> RepoResult<Option<LocalCredentials>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {USER_COLUMNS}, password_hash, password_salt
             FROM users
             WHERE strategy = 'local'
               AND username = ?1 COLLATE NOCASE;"
        ))?;
        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            let user = parse_user_row(row)?;
            let password_hash: Option<String> = row.get("password_hash")?;
            let password_salt: Option<String> = row.get("password_salt")?;
            return match (password_hash, password_salt) {
                (Some(password_hash), Some(password_salt)) => Ok(Some(LocalCredentials {
                    user,
                    password_hash,
                    password_salt,
                })),
                _ => Err(RepoError::InvalidData(format!(
                    "local user `{}` has no password material",
                    user.id
                ))),
            };
        }
        Ok(None)
    }

    /// Finds a third-party user by provider identity.
    pub fn find_third_party(
        &self,
        provider: Provider,
        external_id: &str,
    ) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {USER_COLUMNS}
             FROM users
             WHERE strategy = 'third_party'
               AND provider = ?1
               AND external_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![provider.as_str(), external_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    /// Inserts a third-party user.
    pub fn insert_third_party(
        &self,
        user: &User,
        provider: Provider,
        external_id: &str,
    ) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO users (
                id,
                strategy,
                provider,
                external_id,
                username,
                avatar_url,
                created_at
            ) VALUES (?1, 'third_party', ?2, ?3, ?4, ?5, ?6);",
            params![
                user.id.as_str(),
                provider.as_str(),
                external_id,
                user.username.as_str(),
                user.avatar_url.as_deref(),
                user.created_at,
            ],
        )?;
        Ok(())
    }

    /// Refreshes display fields of a third-party user.
    pub fn update_profile(
        &self,
        user_id: &str,
        username: &str,
        avatar_url: Option<&str>,
    ) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE users SET username = ?2, avatar_url = ?3 WHERE id = ?1;",
            params![user_id, username, avatar_url],
        )?;
        Ok(())
    }

    /// Gets a user by canonical id.
    pub fn get_user(&self, user_id: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1;"))?;
        let mut rows = stmt.query([user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    /// Stores a new session token for `user_id`.
    pub fn insert_session(
        &self,
        session_id: &str,
        user_id: &str,
        created_at: i64,
    ) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (session_id, user_id, created_at) VALUES (?1, ?2, ?3);",
            params![session_id, user_id, created_at],
        )?;
        Ok(())
    }

    /// Resolves a session token to its user id.
    pub fn find_session_user(&self, session_id: &str) -> RepoResult<Option<UserId>> {
        let user_id = self
            .conn
            .query_row(
                "SELECT user_id FROM sessions WHERE session_id = ?1;",
                [session_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(user_id)
    }

    /// Removes a session token. Returns whether a session existed.
    pub fn delete_session(&self, session_id: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE session_id = ?1;", [session_id])?;
        Ok(changed > 0)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let strategy_text: String = row.get("strategy")?;
    let provider_text: Option<String> = row.get("provider")?;
    let strategy = match (strategy_text.as_str(), provider_text) {
        ("local", _) => AuthStrategy::Local,
        ("third_party", Some(provider)) => {
            let provider = provider.parse::<Provider>().map_err(RepoError::InvalidData)?;
            AuthStrategy::ThirdParty(provider)
        }
        (other, provider) => {
            return Err(RepoError::InvalidData(format!(
                "invalid strategy `{other}` (provider {provider:?}) in users.strategy"
            )));
        }
    };

    Ok(User {
        id: row.get("id")?,
        strategy,
        username: row.get("username")?,
        avatar_url: row.get("avatar_url")?,
        created_at: row.get("created_at")?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}
