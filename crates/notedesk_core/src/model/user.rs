//! Authenticated user model.
//!
//! # Invariants
//! - Every strategy resolves to one canonical `UserId`; note logic never
//!   branches on how a user signed in.
//! - Third-party users are unique per `(provider, external_id)`.

use crate::model::note::UserId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Third-party login provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    GitHub,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GitHub => "github",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(Self::GitHub),
            other => Err(format!("unsupported provider `{other}`")),
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a user authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "provider", rename_all = "snake_case")]
pub enum AuthStrategy {
    Local,
    ThirdParty(Provider),
}

/// Stored user profile, without credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub strategy: AuthStrategy,
    pub username: String,
    pub avatar_url: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
