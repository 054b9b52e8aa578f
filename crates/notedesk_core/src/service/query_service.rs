//! Note Query Engine.
//!
//! # Responsibility
//! - Resolve (owner, bucket, page) listings and title searches.
//! - Shape results into display-ready summaries.
//!
//! # Invariants
//! - Results only ever contain notes owned by the requesting user.
//! - Listing and search are ordered by `created_at DESC, id ASC`.
//! - Listing pages hold at most `PAGE_SIZE` notes; search is unpaginated.
//! - Read-only: no operation here mutates the store.

use crate::model::bucket::AgeBucket;
use crate::model::note::{format_display_date, now_epoch_ms, Note, NoteId};
use crate::model::page::Page;
use crate::repo::note_repo::{NoteListQuery, NoteRepository};
use crate::service::{require_user, NoteError, NoteResult};
use log::debug;
use serde::Serialize;

/// Display-ready projection of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary {
    pub id: NoteId,
    pub title: String,
    pub text: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// `created_at` as `DD/MM/YYYY`.
    pub created: String,
    pub archived: bool,
}

impl From<Note> for NoteSummary {
    fn from(note: Note) -> Self {
        Self {
            created: format_display_date(note.created_at),
            id: note.id,
            title: note.title,
            text: note.text,
            created_at: note.created_at,
            archived: note.archived,
        }
    }
}

/// One page of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesPage {
    pub bucket: AgeBucket,
    pub page: Page,
    pub notes: Vec<NoteSummary>,
    /// `true` when the page came back full; see [`Page::has_more`].
    pub has_more: bool,
}

/// Read-side facade over a note repository.
pub struct NoteQueryEngine<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteQueryEngine<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists one page of the user's notes in `age_bucket`, evaluated now.
    ///
    /// # Errors
    /// - `Unauthenticated` when `user_id` is absent or blank.
    /// - `InvalidBucket` when `age_bucket` is not a known selector.
    pub fn list_notes(
        &self,
        user_id: Option<&str>,
        age_bucket: &str,
        page: Page,
    ) -> NoteResult<NotesPage> {
        self.list_notes_at(user_id, age_bucket, page, now_epoch_ms())
    }

    /// Same as [`Self::list_notes`] with recency windows evaluated at `now_ms`.
    pub fn list_notes_at(
        &self,
        user_id: Option<&str>,
        age_bucket: &str,
        page: Page,
        now_ms: i64,
    ) -> NoteResult<NotesPage> {
        let owner_id = require_user(user_id)?;
        let bucket = age_bucket.parse::<AgeBucket>()?;

        let query = NoteListQuery {
            owner_id: owner_id.to_string(),
            archived: bucket.archived(),
            created_after: bucket.cutoff_ms(now_ms),
            limit: page.limit(),
            offset: page.offset(),
        };
        let notes = self.repo.list_notes(&query)?;
        let has_more = Page::has_more(notes.len());

        debug!(
            "event=notes_list module=query status=ok bucket={} page={} count={} has_more={}",
            bucket,
            page.number(),
            notes.len(),
            has_more
        );

        Ok(NotesPage {
            bucket,
            page,
            notes: notes.into_iter().map(NoteSummary::from).collect(),
            has_more,
        })
    }

    /// Case-insensitive substring search on titles of all the user's notes,
    /// active and archived alike.
    ///
    /// # Errors
    /// - `Unauthenticated` when `user_id` is absent or blank.
    /// - `Validation` when `term` is blank.
    pub fn search_notes(&self, user_id: Option<&str>, term: &str) -> NoteResult<Vec<NoteSummary>> {
        let owner_id = require_user(user_id)?;
        let term = term.trim();
        if term.is_empty() {
            return Err(NoteError::validation("term", "search term must not be empty"));
        }

        let notes = self.repo.search_titles(owner_id, term)?;
        debug!(
            "event=notes_search module=query status=ok term_chars={} count={}",
            term.chars().count(),
            notes.len()
        );
        Ok(notes.into_iter().map(NoteSummary::from).collect())
    }
}
