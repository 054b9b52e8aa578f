//! Note Lifecycle Manager.
//!
//! # Responsibility
//! - Create, fetch, edit, archive/unarchive and delete owned notes.
//! - Bulk-delete the archived partition of one owner.
//!
//! # Invariants
//! - State machine per note: `Active <-> Archived`, both `-> Deleted`.
//! - Edits touch only `title`/`text`; `id`, `owner_id`, `created_at` never change.
//! - Archive and unarchive are idempotent; delete of a gone note is `NotFound`.

use crate::model::note::{now_epoch_ms, validate_note_fields, Note, NoteId};
use crate::repo::note_repo::NoteRepository;
use crate::service::{require_user, NoteError, NoteResult};
use log::info;

/// Write-side facade over a note repository.
pub struct NoteLifecycleManager<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteLifecycleManager<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an active note stamped with the current time.
    pub fn create_note(&self, user_id: Option<&str>, title: &str, text: &str) -> NoteResult<Note> {
        let owner_id = require_user(user_id)?;
        validate_note_fields(title, text)?;

        let note = Note::new(owner_id, title, text, now_epoch_ms());
        self.repo.insert_note(&note)?;
        info!("event=note_create module=lifecycle status=ok note_id={}", note.id);
        Ok(note)
    }

    /// Gets one owned note; foreign and missing notes are both `NotFound`.
    pub fn get_note(&self, user_id: Option<&str>, note_id: NoteId) -> NoteResult<Note> {
        let owner_id = require_user(user_id)?;
        self.repo
            .get_note(owner_id, note_id)?
            .ok_or(NoteError::NotFound(note_id))
    }

    /// Replaces title and text of an owned note.
    pub fn edit_note(
        &mut self,
        user_id: Option<&str>,
        note_id: NoteId,
        title: &str,
        text: &str,
    ) -> NoteResult<Note> {
        let owner_id = require_user(user_id)?;
        validate_note_fields(title, text)?;

        let note = self.repo.update_content(owner_id, note_id, title, text)?;
        info!("event=note_edit module=lifecycle status=ok note_id={note_id}");
        Ok(note)
    }

    /// Moves an owned note to the archived partition.
    pub fn archive_note(&mut self, user_id: Option<&str>, note_id: NoteId) -> NoteResult<Note> {
        self.set_archived(user_id, note_id, true)
    }

    /// Moves an owned note back to the active partition.
    pub fn unarchive_note(&mut self, user_id: Option<&str>, note_id: NoteId) -> NoteResult<Note> {
        self.set_archived(user_id, note_id, false)
    }

    /// Permanently removes an owned note.
    pub fn delete_note(&self, user_id: Option<&str>, note_id: NoteId) -> NoteResult<()> {
        let owner_id = require_user(user_id)?;
        self.repo.delete_note(owner_id, note_id)?;
        info!("event=note_delete module=lifecycle status=ok note_id={note_id}");
        Ok(())
    }

    /// Removes every archived note of the user atomically; returns the count.
    pub fn delete_all_archived(&mut self, user_id: Option<&str>) -> NoteResult<u64> {
        let owner_id = require_user(user_id)?;
        let deleted = self.repo.delete_archived(owner_id)?;
        info!("event=notes_delete_archived module=lifecycle status=ok deleted={deleted}");
        Ok(deleted)
    }

    fn set_archived(
        &mut self,
        user_id: Option<&str>,
        note_id: NoteId,
        archived: bool,
    ) -> NoteResult<Note> {
        let owner_id = require_user(user_id)?;
        let note = self.repo.set_archived(owner_id, note_id, archived)?;
        info!(
            "event=note_archive module=lifecycle status=ok note_id={note_id} archived={archived}"
        );
        Ok(note)
    }
}
