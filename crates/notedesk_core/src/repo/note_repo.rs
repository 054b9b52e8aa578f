//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped note persistence over the `notes` table.
//! - Push bucket filters, title search and pagination into SQL.
//! - Title search folds case with Unicode rules on both sides of `LIKE`,
//!   so the connection must come from `db::open_db*`.
//!
//! # Invariants
//! - Every statement filters by `owner_id`; foreign notes behave as missing.
//! - Reads are ordered by `created_at DESC, id ASC`.
//! - Mutations that return the updated row run inside one IMMEDIATE
//!   transaction, so the read-back reflects exactly that write.
//! - `delete_archived` removes the whole archived set in one transaction.

use crate::db::{fold_case, FOLD_CASE_SQL_FN};
use crate::model::note::{validate_note_fields, Note, NoteId};
use crate::repo::{ensure_table_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    text,
    archived,
    created_at
FROM notes";

const NOTE_ORDER_SQL: &str = " ORDER BY created_at DESC, id ASC";

/// Filter and window options for owner-scoped note listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListQuery {
    pub owner_id: String,
    /// Archived flag value to select.
    pub archived: bool,
    /// Exclusive lower bound on `created_at`.
    pub created_after: Option<i64>,
    pub limit: u32,
    pub offset: u64,
}

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Inserts a fully formed note.
    fn insert_note(&self, note: &Note) -> RepoResult<()>;
    /// Gets one note owned by `owner_id`.
    fn get_note(&self, owner_id: &str, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists one page of notes matching the query.
    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    /// Case-insensitive substring search on titles across all owned notes.
    fn search_titles(&self, owner_id: &str, term: &str) -> RepoResult<Vec<Note>>;
    /// Replaces title and text, returning the updated note.
    fn update_content(
        &mut self,
        owner_id: &str,
        id: NoteId,
        title: &str,
        text: &str,
    ) -> RepoResult<Note>;
    /// Sets the archived flag, returning the updated note.
    fn set_archived(&mut self, owner_id: &str, id: NoteId, archived: bool) -> RepoResult<Note>;
    /// Removes one owned note.
    fn delete_note(&self, owner_id: &str, id: NoteId) -> RepoResult<()>;
    /// Removes every archived note of `owner_id`, returning the count.
    fn delete_archived(&mut self, owner_id: &str) -> RepoResult<u64>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "notes",
            &["id", "owner_id", "title", "text", "archived", "created_at"],
        )?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        self.conn.execute(
            "INSERT INTO notes (
                id,
                owner_id,
                title,
                text,
                archived,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                note.id.to_string(),
                note.owner_id.as_str(),
                note.title.as_str(),
                note.text.as_str(),
                bool_to_int(note.archived),
                note.created_at,
            ],
        )?;

        Ok(())
    }

    fn get_note(&self, owner_id: &str, id: NoteId) -> RepoResult<Option<Note>> {
        select_owned_note(self.conn, owner_id, id)
    }

    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let mut sql = format!("{NOTE_SELECT_SQL} WHERE owner_id = ? AND archived = ?");
        let mut bind_values: Vec<Value> = vec![
            Value::Text(query.owner_id.clone()),
            Value::Integer(bool_to_int(query.archived)),
        ];

        if let Some(cutoff) = query.created_after {
            sql.push_str(" AND created_at > ?");
            bind_values.push(Value::Integer(cutoff));
        }

        sql.push_str(NOTE_ORDER_SQL);
        sql.push_str(" LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(query.limit)));
        bind_values.push(Value::Integer(
            i64::try_from(query.offset).unwrap_or(i64::MAX),
        ));

        query_notes(self.conn, &sql, bind_values)
    }

    fn search_titles(&self, owner_id: &str, term: &str) -> RepoResult<Vec<Note>> {
        let sql = format!(
            "{NOTE_SELECT_SQL}
             WHERE owner_id = ?
               AND {FOLD_CASE_SQL_FN}(title) LIKE ? ESCAPE '\\'{NOTE_ORDER_SQL}"
        );
        let bind_values = vec![
            Value::Text(owner_id.to_string()),
            Value::Text(format!("%{}%", escape_like(&fold_case(term)))),
        ];
        query_notes(self.conn, &sql, bind_values)
    }

    fn update_content(
        &mut self,
        owner_id: &str,
        id: NoteId,
        title: &str,
        text: &str,
    ) -> RepoResult<Note> {
        validate_note_fields(title, text)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE notes
             SET title = ?3, text = ?4
             WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner_id, title, text],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        let note = select_owned_note(&tx, owner_id, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(note)
    }

    fn set_archived(&mut self, owner_id: &str, id: NoteId, archived: bool) -> RepoResult<Note> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        // SQLite counts matched rows, so re-archiving still reports one change.
        let changed = tx.execute(
            "UPDATE notes
             SET archived = ?3
             WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner_id, bool_to_int(archived)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        let note = select_owned_note(&tx, owner_id, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(note)
    }

    fn delete_note(&self, owner_id: &str, id: NoteId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_archived(&mut self, owner_id: &str) -> RepoResult<u64> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let deleted = tx.execute(
            "DELETE FROM notes WHERE owner_id = ?1 AND archived = 1;",
            [owner_id],
        )?;
        tx.commit()?;
        Ok(deleted as u64)
    }
}

/// Escapes `LIKE` wildcards so the term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn select_owned_note(conn: &Connection, owner_id: &str, id: NoteId) -> RepoResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!(
        "{NOTE_SELECT_SQL}
         WHERE id = ?1
           AND owner_id = ?2;"
    ))?;

    let mut rows = stmt.query(params![id.to_string(), owner_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_note_row(row)?));
    }

    Ok(None)
}

fn query_notes(conn: &Connection, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Note>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(parse_note_row(row)?);
    }
    Ok(notes)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in notes.id"))
    })?;

    let archived = match row.get::<_, i64>("archived")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid archived value `{other}` in notes.archived"
            )));
        }
    };

    Ok(Note {
        id,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
        archived,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_protects_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\x"), "c:\\\\x");
        assert_eq!(escape_like("plain"), "plain");
    }
}
