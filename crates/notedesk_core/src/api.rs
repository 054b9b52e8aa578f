//! Routing-layer API over the note core.
//!
//! # Responsibility
//! - Accept raw request fields (session token, selectors, ids as strings).
//! - Resolve identity per request, then call the query engine or lifecycle
//!   manager.
//! - Return serializable envelopes with stable error codes.
//!
//! # Invariants
//! - Functions never panic; every failure becomes an envelope error.
//! - List/search failures return empty `notes` plus an error.
//! - Mutation failures return `ok=false` plus an error code.

use crate::export::{export_note, DocumentExporter, ExportError, ExportedDocument};
use crate::model::note::{NoteId, UserId};
use crate::model::page::Page;
use crate::model::user::{AuthStrategy, Provider};
use crate::repo::note_repo::SqliteNoteRepository;
use crate::repo::user_repo::SqliteUserRepository;
use crate::repo::RepoError;
use crate::service::identity_service::{
    Authenticated, IdentityError, IdentityProvider, IdentityService,
};
use crate::service::lifecycle_service::NoteLifecycleManager;
use crate::service::query_service::{NoteQueryEngine, NoteSummary};
use crate::service::NoteError;
use log::warn;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

/// Error payload carried by every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<NoteError> for ApiError {
    fn from(value: NoteError) -> Self {
        Self::new(value.code(), value.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        NoteError::StoreUnavailable(value).into()
    }
}

impl From<ExportError> for ApiError {
    fn from(value: ExportError) -> Self {
        Self::new("export_failed", value.to_string())
    }
}

impl From<IdentityError> for ApiError {
    fn from(value: IdentityError) -> Self {
        let code = match &value {
            IdentityError::Validation { .. } => "validation_error",
            IdentityError::UsernameTaken(_) => "username_taken",
            IdentityError::InvalidCredentials => "invalid_credentials",
            IdentityError::Repo(_) => "store_unavailable",
        };
        Self::new(code, value.to_string())
    }
}

/// Bucket listing envelope: `{notes, hasMore, page, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesListResponse {
    pub notes: Vec<NoteSummary>,
    /// Full-page heuristic; not an exact count of remaining notes.
    pub has_more: bool,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// Title search envelope: `{notes, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotesSearchResponse {
    pub notes: Vec<NoteSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// Single-note envelope for get/create/edit/archive/unarchive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<NoteSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl NoteResponse {
    fn from_result(operation: &'static str, result: Result<NoteSummary, ApiError>) -> Self {
        match result {
            Ok(note) => Self {
                ok: true,
                note: Some(note),
                error: None,
            },
            Err(err) => Self {
                ok: false,
                note: None,
                error: Some(log_failure(operation, err)),
            },
        }
    }
}

/// Delete envelope: `{ok, deleted, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
    pub deleted: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl DeleteResponse {
    fn from_result(operation: &'static str, result: Result<u64, ApiError>) -> Self {
        match result {
            Ok(deleted) => Self {
                ok: true,
                deleted,
                error: None,
            },
            Err(err) => Self {
                ok: false,
                deleted: 0,
                error: Some(log_failure(operation, err)),
            },
        }
    }
}

/// Login/signup envelope carrying the new session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<AuthStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl SessionResponse {
    fn from_result(operation: &'static str, result: Result<Authenticated, IdentityError>) -> Self {
        match result {
            Ok(auth) => Self {
                ok: true,
                session_id: Some(auth.session_id),
                user_id: Some(auth.user.id),
                username: Some(auth.user.username),
                strategy: Some(auth.user.strategy),
                error: None,
            },
            Err(err) => Self {
                ok: false,
                session_id: None,
                user_id: None,
                username: None,
                strategy: None,
                error: Some(log_failure(operation, err.into())),
            },
        }
    }
}

/// Lists one page of the caller's notes in the `age` bucket.
pub fn list_notes(
    conn: &mut Connection,
    session_id: Option<&str>,
    age: &str,
    page: Option<&str>,
) -> NotesListResponse {
    let page = Page::parse(page);
    let result = authorize(conn, session_id).and_then(|user_id| {
        let repo = SqliteNoteRepository::try_new(conn)?;
        let engine = NoteQueryEngine::new(repo);
        Ok(engine.list_notes(Some(user_id.as_str()), age, page)?)
    });

    match result {
        Ok(listed) => NotesListResponse {
            notes: listed.notes,
            has_more: listed.has_more,
            page: listed.page.number(),
            error: None,
        },
        Err(err) => NotesListResponse {
            notes: Vec::new(),
            has_more: false,
            page: page.number(),
            error: Some(log_failure("notes_list", err)),
        },
    }
}

/// Searches titles of all the caller's notes.
pub fn search_notes(
    conn: &mut Connection,
    session_id: Option<&str>,
    term: &str,
) -> NotesSearchResponse {
    let result = authorize(conn, session_id).and_then(|user_id| {
        let repo = SqliteNoteRepository::try_new(conn)?;
        let engine = NoteQueryEngine::new(repo);
        Ok(engine.search_notes(Some(user_id.as_str()), term)?)
    });

    match result {
        Ok(notes) => NotesSearchResponse { notes, error: None },
        Err(err) => NotesSearchResponse {
            notes: Vec::new(),
            error: Some(log_failure("notes_search", err)),
        },
    }
}

pub fn create_note(
    conn: &mut Connection,
    session_id: Option<&str>,
    title: &str,
    text: &str,
) -> NoteResponse {
    let result = with_manager(conn, session_id, |manager, user_id| {
        Ok(manager.create_note(Some(user_id), title, text)?)
    });
    NoteResponse::from_result("note_create", result.map(NoteSummary::from))
}

pub fn get_note(conn: &mut Connection, session_id: Option<&str>, note_id: &str) -> NoteResponse {
    let result = with_manager(conn, session_id, |manager, user_id| {
        let id = parse_note_id(note_id)?;
        Ok(manager.get_note(Some(user_id), id)?)
    });
    NoteResponse::from_result("note_get", result.map(NoteSummary::from))
}

pub fn edit_note(
    conn: &mut Connection,
    session_id: Option<&str>,
    note_id: &str,
    title: &str,
    text: &str,
) -> NoteResponse {
    let result = with_manager(conn, session_id, |manager, user_id| {
        let id = parse_note_id(note_id)?;
        Ok(manager.edit_note(Some(user_id), id, title, text)?)
    });
    NoteResponse::from_result("note_edit", result.map(NoteSummary::from))
}

pub fn archive_note(
    conn: &mut Connection,
    session_id: Option<&str>,
    note_id: &str,
) -> NoteResponse {
    let result = with_manager(conn, session_id, |manager, user_id| {
        let id = parse_note_id(note_id)?;
        Ok(manager.archive_note(Some(user_id), id)?)
    });
    NoteResponse::from_result("note_archive", result.map(NoteSummary::from))
}

pub fn unarchive_note(
    conn: &mut Connection,
    session_id: Option<&str>,
    note_id: &str,
) -> NoteResponse {
    let result = with_manager(conn, session_id, |manager, user_id| {
        let id = parse_note_id(note_id)?;
        Ok(manager.unarchive_note(Some(user_id), id)?)
    });
    NoteResponse::from_result("note_unarchive", result.map(NoteSummary::from))
}

pub fn delete_note(
    conn: &mut Connection,
    session_id: Option<&str>,
    note_id: &str,
) -> DeleteResponse {
    let result = with_manager(conn, session_id, |manager, user_id| {
        let id = parse_note_id(note_id)?;
        manager.delete_note(Some(user_id), id)?;
        Ok(1)
    });
    DeleteResponse::from_result("note_delete", result)
}

pub fn delete_all_archived(conn: &mut Connection, session_id: Option<&str>) -> DeleteResponse {
    let result = with_manager(conn, session_id, |manager, user_id| {
        Ok(manager.delete_all_archived(Some(user_id))?)
    });
    DeleteResponse::from_result("notes_delete_archived", result)
}

/// Renders an owned note with `exporter` for download.
pub fn download_note(
    conn: &mut Connection,
    session_id: Option<&str>,
    note_id: &str,
    exporter: &dyn DocumentExporter,
) -> Result<ExportedDocument, ApiError> {
    with_manager(conn, session_id, |manager, user_id| {
        let id = parse_note_id(note_id)?;
        Ok(manager.get_note(Some(user_id), id)?)
    })
    .and_then(|note| export_note(exporter, &note).map_err(ApiError::from))
    .map_err(|err| log_failure("note_download", err))
}

pub fn signup(conn: &Connection, username: &str, password: &str) -> SessionResponse {
    let result = identity(conn).and_then(|service| service.signup_local(username, password));
    SessionResponse::from_result("user_signup", result)
}

pub fn login(conn: &Connection, username: &str, password: &str) -> SessionResponse {
    let result = identity(conn).and_then(|service| service.login_local(username, password));
    SessionResponse::from_result("user_login", result)
}

/// Completes a third-party login whose profile the provider already verified.
pub fn login_third_party(
    conn: &Connection,
    provider: Provider,
    external_id: &str,
    username: &str,
    avatar_url: Option<&str>,
) -> SessionResponse {
    let result = identity(conn).and_then(|service| {
        service.login_third_party(provider, external_id, username, avatar_url)
    });
    SessionResponse::from_result("user_login_third_party", result)
}

/// Revokes the session; unknown tokens are not an error.
pub fn logout(conn: &Connection, session_id: &str) -> DeleteResponse {
    let result = identity(conn)
        .and_then(|service| service.logout(session_id))
        .map(u64::from)
        .map_err(ApiError::from);
    DeleteResponse::from_result("user_logout", result)
}

/// Profile behind the session, with `unauthenticated` when there is none.
pub fn whoami(conn: &Connection, session_id: Option<&str>) -> SessionResponse {
    let result = identity(conn).and_then(|service| service.current_user(session_id));
    match result {
        Ok(Some(user)) => SessionResponse {
            ok: true,
            session_id: None,
            user_id: Some(user.id),
            username: Some(user.username),
            strategy: Some(user.strategy),
            error: None,
        },
        Ok(None) => SessionResponse {
            ok: false,
            session_id: None,
            user_id: None,
            username: None,
            strategy: None,
            error: Some(NoteError::Unauthenticated.into()),
        },
        Err(err) => SessionResponse::from_result("user_whoami", Err(err)),
    }
}

fn identity(conn: &Connection) -> Result<IdentityService<'_>, IdentityError> {
    Ok(IdentityService::new(SqliteUserRepository::try_new(conn)?))
}

fn authorize(conn: &Connection, session_id: Option<&str>) -> Result<UserId, ApiError> {
    identity(conn)
        .and_then(|service| service.current_user_id(session_id))?
        .ok_or_else(|| NoteError::Unauthenticated.into())
}

/// Authorizes the session, then runs `operation` against a lifecycle manager.
fn with_manager<T>(
    conn: &mut Connection,
    session_id: Option<&str>,
    operation: impl FnOnce(
        &mut NoteLifecycleManager<SqliteNoteRepository<'_>>,
        &str,
    ) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let user_id = authorize(conn, session_id)?;
    let repo = SqliteNoteRepository::try_new(conn)?;
    let mut manager = NoteLifecycleManager::new(repo);
    operation(&mut manager, user_id.as_str())
}

/// Unparseable ids cannot name an existing note, so they are `not_found`.
fn parse_note_id(raw: &str) -> Result<NoteId, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::new("not_found", format!("note not found: {}", raw.trim())))
}

fn log_failure(operation: &'static str, err: ApiError) -> ApiError {
    warn!(
        "event={} module=api status=error error_code={} error={}",
        operation, err.code, err.message
    );
    err
}
