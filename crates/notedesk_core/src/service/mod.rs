//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own the shared note error taxonomy surfaced to routing layers.
//!
//! # Invariants
//! - Every note operation requires a resolved owner id.
//! - Store failures surface as `StoreUnavailable`, never as partial writes.

use crate::model::bucket::UnknownBucket;
use crate::model::note::{NoteId, NoteValidationError};
use crate::repo::RepoError;
use thiserror::Error;

pub mod identity_service;
pub mod lifecycle_service;
pub mod query_service;

pub type NoteResult<T> = Result<T, NoteError>;

/// Typed failure of a note query or lifecycle operation.
#[derive(Debug, Error)]
pub enum NoteError {
    /// No authenticated user accompanied the request.
    #[error("authentication required")]
    Unauthenticated,
    /// Empty or otherwise invalid input field.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    /// Age selector outside the known bucket set.
    #[error(transparent)]
    InvalidBucket(#[from] UnknownBucket),
    /// Note is missing or owned by someone else.
    #[error("note not found: {0}")]
    NotFound(NoteId),
    /// Store failure; no partial mutation was applied.
    #[error("note store unavailable: {0}")]
    StoreUnavailable(#[source] RepoError),
}

impl NoteError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Validation { .. } => "validation_error",
            Self::InvalidBucket(_) => "invalid_bucket",
            Self::NotFound(_) => "not_found",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<NoteValidationError> for NoteError {
    fn from(value: NoteValidationError) -> Self {
        Self::validation(value.field(), value.to_string())
    }
}

impl From<RepoError> for NoteError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => err.into(),
            other => Self::StoreUnavailable(other),
        }
    }
}

/// Returns the trimmed owner id, or `Unauthenticated` when absent or blank.
pub(crate) fn require_user(user_id: Option<&str>) -> NoteResult<&str> {
    match user_id.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(NoteError::Unauthenticated),
    }
}
