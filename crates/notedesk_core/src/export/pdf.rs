//! PDF exporter built on `lopdf`.
//!
//! # Invariants
//! - Output is a single-column A4 document: title in bold, display date,
//!   blank line, then the note text wrapped at word boundaries.
//! - Text uses the standard Courier fonts with `WinAnsiEncoding`; characters
//!   outside that encoding render as `?`.
//! - Every page holds at most `LINES_PER_PAGE` lines; long notes spill onto
//!   further pages.

use super::{DocumentExporter, ExportError};
use crate::model::note::Note;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 56;
const FONT_SIZE: i64 = 11;
const LEADING: i64 = 14;
/// Courier advances 0.6 em, so 72 columns fit between the margins.
const MAX_LINE_CHARS: usize = 72;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Exports notes as downloadable PDF documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExporter;

impl DocumentExporter for PdfExporter {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, note: &Note) -> Result<Vec<u8>, ExportError> {
        let lines = layout_lines(note);
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(font_dictionary("Courier"));
        let bold_id = doc.add_object(font_dictionary("Courier-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => regular_id,
                BOLD_FONT => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for chunk in lines.chunks(LINES_PER_PAGE) {
            let content = page_content(chunk);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let page_count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

struct Line {
    font: &'static str,
    text: String,
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn layout_lines(note: &Note) -> Vec<Line> {
    let mut lines: Vec<Line> = wrap_line(&note.title, MAX_LINE_CHARS)
        .into_iter()
        .map(|text| Line {
            font: BOLD_FONT,
            text,
        })
        .collect();
    lines.push(Line {
        font: REGULAR_FONT,
        text: note.display_date(),
    });
    lines.push(Line {
        font: REGULAR_FONT,
        text: String::new(),
    });
    for paragraph in note.text.lines() {
        lines.extend(
            wrap_line(paragraph, MAX_LINE_CHARS)
                .into_iter()
                .map(|text| Line {
                    font: REGULAR_FONT,
                    text,
                }),
        );
    }
    lines
}

fn page_content(lines: &[Line]) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("TL", vec![Object::Integer(LEADING)]),
        Operation::new(
            "Td",
            vec![Object::Integer(MARGIN), Object::Integer(PAGE_HEIGHT - MARGIN)],
        ),
    ];
    let mut active_font = "";
    for line in lines {
        if line.font != active_font {
            operations.push(Operation::new(
                "Tf",
                vec![
                    Object::Name(line.font.as_bytes().to_vec()),
                    Object::Integer(FONT_SIZE),
                ],
            ));
            active_font = line.font;
        }
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(win_ansi_bytes(&line.text))],
        ));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Splits one paragraph into lines of at most `width` characters.
///
/// An empty paragraph yields a single empty line.
fn wrap_line(paragraph: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in paragraph.split_whitespace() {
        let mut rest: Vec<char> = word.chars().collect();
        while !rest.is_empty() {
            let room = if current_len == 0 {
                width
            } else {
                width.saturating_sub(current_len + 1)
            };
            if rest.len() <= room {
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current_len += rest.len();
                current.extend(rest.drain(..));
            } else if current_len > 0 {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            } else {
                out.push(rest.drain(..width).collect());
            }
        }
    }

    if current_len > 0 || out.is_empty() {
        out.push(current);
    }
    out
}

/// Maps text onto `WinAnsiEncoding`; Latin-1 maps byte-for-byte.
fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\t' => b' ',
            ' '..='~' => ch as u8,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            _ => b'?',
        })
        .collect()
}
