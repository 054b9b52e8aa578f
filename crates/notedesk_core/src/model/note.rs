//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record shared by query and lifecycle paths.
//! - Validate user-editable fields before they reach storage.
//!
//! # Invariants
//! - `id`, `owner_id` and `created_at` never change after creation.
//! - `title` and `text` are never blank.
//! - `archived` is the only source of truth for the active/archived partition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Stable identifier of a note.
pub type NoteId = Uuid;

/// Canonical identifier of an authenticated user.
///
/// Identity strategies (local password, third-party login) are resolved to
/// this plain value before reaching note logic.
pub type UserId = String;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 255;

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Visibility partition of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteState {
    Active,
    Archived,
}

/// Field-level validation failure for note content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("text must not be empty")]
    EmptyText,
    #[error("title is {actual} characters, limit is {max}")]
    TitleTooLong { max: usize, actual: usize },
}

impl NoteValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyText => "text",
        }
    }
}

/// Owner-scoped note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub owner_id: UserId,
    pub title: String,
    pub text: String,
    /// Unix epoch milliseconds, set once at creation.
    pub created_at: i64,
    pub archived: bool,
}

impl Note {
    /// Creates an active note with a generated id.
    pub fn new(
        owner_id: impl Into<UserId>,
        title: impl Into<String>,
        text: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            title: title.into(),
            text: text.into(),
            created_at,
            archived: false,
        }
    }

    /// Validates user-editable fields.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_note_fields(&self.title, &self.text)
    }

    pub fn state(&self) -> NoteState {
        if self.archived {
            NoteState::Archived
        } else {
            NoteState::Active
        }
    }

    /// `created_at` rendered as `DD/MM/YYYY` (UTC).
    pub fn display_date(&self) -> String {
        format_display_date(self.created_at)
    }
}

/// Checks that title and text are present and the title fits its column.
pub fn validate_note_fields(title: &str, text: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    let title_chars = title.chars().count();
    if title_chars > TITLE_MAX_CHARS {
        return Err(NoteValidationError::TitleTooLong {
            max: TITLE_MAX_CHARS,
            actual: title_chars,
        });
    }
    if text.trim().is_empty() {
        return Err(NoteValidationError::EmptyText);
    }
    Ok(())
}

/// Formats epoch milliseconds as `DD/MM/YYYY` in UTC.
///
/// Returns an empty string for timestamps chrono cannot represent.
pub fn format_display_date(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|value| value.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{format_display_date, validate_note_fields, Note, NoteState, NoteValidationError};

    #[test]
    fn display_date_uses_day_month_year() {
        // 2022-10-03T14:24:36Z
        assert_eq!(format_display_date(1_664_807_076_000), "03/10/2022");
        assert_eq!(format_display_date(0), "01/01/1970");
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert_eq!(
            validate_note_fields("  ", "body"),
            Err(NoteValidationError::EmptyTitle)
        );
        assert_eq!(
            validate_note_fields("title", "\n"),
            Err(NoteValidationError::EmptyText)
        );
        assert!(validate_note_fields("title", "body").is_ok());
    }

    #[test]
    fn overlong_title_is_rejected() {
        let title = "x".repeat(256);
        let err = validate_note_fields(&title, "body").unwrap_err();
        assert_eq!(err.field(), "title");
    }

    #[test]
    fn new_note_starts_active() {
        let note = Note::new("user-1", "A", "x", 42);
        assert!(!note.archived);
        assert_eq!(note.state(), NoteState::Active);
        assert_eq!(note.created_at, 42);
    }
}
