//! Core domain logic for NoteDesk.
//! This crate is the single source of truth for note ownership, recency
//! buckets, pagination and the active/archived lifecycle.

pub mod api;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use export::{DocumentExporter, ExportError, ExportedDocument, PdfExporter, PlainTextExporter};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::bucket::{AgeBucket, MONTH_WINDOW_MS, THREE_MONTHS_WINDOW_MS};
pub use model::note::{Note, NoteId, NoteState, NoteValidationError, UserId};
pub use model::page::{Page, PAGE_SIZE};
pub use model::user::{AuthStrategy, Provider, User};
pub use repo::note_repo::{NoteListQuery, NoteRepository, SqliteNoteRepository};
pub use repo::user_repo::SqliteUserRepository;
pub use repo::{RepoError, RepoResult};
pub use service::identity_service::{IdentityError, IdentityProvider, IdentityService};
pub use service::lifecycle_service::NoteLifecycleManager;
pub use service::query_service::{NoteQueryEngine, NoteSummary, NotesPage};
pub use service::{NoteError, NoteResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
