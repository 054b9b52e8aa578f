//! Domain model for owner-scoped notes and their retrieval selectors.
//!
//! # Responsibility
//! - Define the canonical `Note` record and its field validation.
//! - Define view selectors (`AgeBucket`) and pagination (`Page`).
//! - Define the user identity shapes resolved before note access.
//!
//! # Invariants
//! - Every note has exactly one owner and a stable `NoteId`.
//! - A note is either active or archived, decided solely by `archived`.

pub mod bucket;
pub mod note;
pub mod page;
pub mod user;
