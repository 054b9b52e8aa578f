//! Application SQL functions registered on every connection.
//!
//! # Invariants
//! - `notedesk_fold(text)` lowercases with full Unicode rules, so
//!   `notedesk_fold(a) LIKE fold_case(b)` is case-insensitive beyond ASCII.
//! - `NULL` input yields `NULL`.

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::Connection;

/// SQL name of the Unicode case-folding scalar.
pub const FOLD_CASE_SQL_FN: &str = "notedesk_fold";

/// Rust-side twin of `notedesk_fold`; bind parameters must go through it.
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

pub(crate) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_SQL_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        fold_case_sql,
    )
}

fn fold_case_sql(ctx: &Context<'_>) -> rusqlite::Result<Option<String>> {
    let value = ctx.get::<Option<String>>(0)?;
    Ok(value.as_deref().map(fold_case))
}
