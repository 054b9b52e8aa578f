//! Document export of single notes.
//!
//! # Responsibility
//! - Define the exporter seam used by download routes.
//! - Provide PDF and plain-text exporters and safe download file names.
//!
//! # Invariants
//! - Exporters only see note content; ownership is checked before export.
//! - File names never contain path separators or control characters.

use crate::model::note::Note;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

mod pdf;

pub use pdf::PdfExporter;

static UNSAFE_FILE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f]+"#).expect("valid file name regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const FALLBACK_FILE_STEM: &str = "note";
const MAX_FILE_STEM_CHARS: usize = 80;

/// Document rendering failure.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("pdf rendering failed: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("document write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns a note into downloadable document bytes.
pub trait DocumentExporter {
    /// MIME type of rendered documents.
    fn content_type(&self) -> &'static str;
    /// File extension without the leading dot.
    fn file_extension(&self) -> &'static str;
    /// Renders the note body.
    fn render(&self, note: &Note) -> Result<Vec<u8>, ExportError>;
}

/// UTF-8 text exporter: title, display date, blank line, text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExporter;

impl DocumentExporter for PlainTextExporter {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, note: &Note) -> Result<Vec<u8>, ExportError> {
        Ok(format!("{}\n{}\n\n{}\n", note.title, note.display_date(), note.text).into_bytes())
    }
}

/// Rendered document ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Renders `note` with `exporter` and names the file after its title.
pub fn export_note(
    exporter: &dyn DocumentExporter,
    note: &Note,
) -> Result<ExportedDocument, ExportError> {
    Ok(ExportedDocument {
        file_name: export_file_name(&note.title, exporter.file_extension()),
        content_type: exporter.content_type(),
        bytes: exporter.render(note)?,
    })
}

/// Builds a download file name from a note title.
pub fn export_file_name(title: &str, extension: &str) -> String {
    let without_unsafe = UNSAFE_FILE_CHARS_RE.replace_all(title, " ");
    let collapsed = WHITESPACE_RE.replace_all(&without_unsafe, " ");
    let stem: String = collapsed
        .trim()
        .trim_matches('.')
        .chars()
        .take(MAX_FILE_STEM_CHARS)
        .collect();
    let stem = stem.trim();
    if stem.is_empty() {
        format!("{FALLBACK_FILE_STEM}.{extension}")
    } else {
        format!("{stem}.{extension}")
    }
}
