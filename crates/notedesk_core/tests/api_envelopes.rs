use notedesk_core::api;
use notedesk_core::db::open_db_in_memory;
use notedesk_core::{PdfExporter, PlainTextExporter};
use rusqlite::Connection;
use serde_json::Value;

fn session(conn: &Connection, username: &str) -> String {
    let response = api::signup(conn, username, "pw");
    assert!(response.ok);
    response.session_id.unwrap()
}

#[test]
fn create_list_archive_flow_matches_buckets() {
    let mut conn = open_db_in_memory().unwrap();
    let token = session(&conn, "u");

    let created = api::create_note(&mut conn, Some(token.as_str()), "A", "x");
    assert!(created.ok);
    let note_id = created.note.unwrap().id.to_string();

    let listed = api::list_notes(&mut conn, Some(token.as_str()), "1month", Some("1"));
    assert_eq!(listed.notes.len(), 1);
    assert!(!listed.has_more);
    assert!(listed.error.is_none());

    assert!(api::archive_note(&mut conn, Some(token.as_str()), &note_id).ok);
    assert!(api::list_notes(&mut conn, Some(token.as_str()), "1month", None)
        .notes
        .is_empty());
    assert_eq!(
        api::list_notes(&mut conn, Some(token.as_str()), "archive", None)
            .notes
            .len(),
        1
    );

    let found = api::search_notes(&mut conn, Some(token.as_str()), "a");
    assert_eq!(found.notes.len(), 1);
}

#[test]
fn list_failures_return_empty_notes_with_error_code() {
    let mut conn = open_db_in_memory().unwrap();
    let token = session(&conn, "u");

    let unauthenticated = api::list_notes(&mut conn, None, "alltime", None);
    assert!(unauthenticated.notes.is_empty());
    assert_eq!(unauthenticated.error.unwrap().code, "unauthenticated");

    let bad_bucket = api::list_notes(&mut conn, Some(token.as_str()), "forever", None);
    assert!(bad_bucket.notes.is_empty());
    assert_eq!(bad_bucket.error.unwrap().code, "invalid_bucket");

    let stale = api::search_notes(&mut conn, Some("revoked-token"), "a");
    assert_eq!(stale.error.unwrap().code, "unauthenticated");
}

#[test]
fn non_numeric_page_defaults_to_first_page() {
    let mut conn = open_db_in_memory().unwrap();
    let token = session(&conn, "u");
    for idx in 0..11 {
        api::create_note(&mut conn, Some(token.as_str()), &format!("n{idx}"), "x");
    }

    let listed = api::list_notes(&mut conn, Some(token.as_str()), "alltime", Some("abc"));
    assert_eq!(listed.page, 1);
    assert_eq!(listed.notes.len(), 10);
    assert!(listed.has_more);

    let second = api::list_notes(&mut conn, Some(token.as_str()), "alltime", Some("2"));
    assert_eq!(second.notes.len(), 1);
    assert!(!second.has_more);
}

#[test]
fn mutations_report_explicit_error_codes() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = session(&conn, "owner");
    let intruder = session(&conn, "intruder");
    let note_id = api::create_note(&mut conn, Some(owner.as_str()), "t", "x")
        .note
        .unwrap()
        .id
        .to_string();

    let foreign = api::edit_note(&mut conn, Some(intruder.as_str()), &note_id, "t2", "x2");
    assert!(!foreign.ok);
    assert_eq!(foreign.error.unwrap().code, "not_found");

    let garbage_id = api::get_note(&mut conn, Some(owner.as_str()), "not-a-uuid");
    assert_eq!(garbage_id.error.unwrap().code, "not_found");

    let unauthenticated = api::get_note(&mut conn, None, "not-a-uuid");
    assert_eq!(unauthenticated.error.unwrap().code, "unauthenticated");

    let invalid = api::create_note(&mut conn, Some(owner.as_str()), "", "x");
    assert_eq!(invalid.error.unwrap().code, "validation_error");

    assert!(api::delete_note(&mut conn, Some(owner.as_str()), &note_id).ok);
    let again = api::delete_note(&mut conn, Some(owner.as_str()), &note_id);
    assert!(!again.ok);
    assert_eq!(again.error.unwrap().code, "not_found");
}

#[test]
fn delete_all_archived_reports_count() {
    let mut conn = open_db_in_memory().unwrap();
    let token = session(&conn, "u");
    for title in ["a", "b"] {
        let id = api::create_note(&mut conn, Some(token.as_str()), title, "x")
            .note
            .unwrap()
            .id
            .to_string();
        api::archive_note(&mut conn, Some(token.as_str()), &id);
    }

    let response = api::delete_all_archived(&mut conn, Some(token.as_str()));
    assert!(response.ok);
    assert_eq!(response.deleted, 2);
}

#[test]
fn envelopes_serialize_in_camel_case() {
    let mut conn = open_db_in_memory().unwrap();
    let token = session(&conn, "u");
    api::create_note(&mut conn, Some(token.as_str()), "A", "x");

    let listed = api::list_notes(&mut conn, Some(token.as_str()), "alltime", None);
    let json: Value = serde_json::to_value(&listed).unwrap();
    assert_eq!(json["hasMore"], Value::Bool(false));
    assert!(json.get("error").is_none());
    let note = &json["notes"][0];
    assert_eq!(note["title"], "A");
    assert!(note["createdAt"].is_i64());
    assert!(note["created"].as_str().unwrap().contains('/'));

    let failed = api::list_notes(&mut conn, None, "alltime", None);
    let json: Value = serde_json::to_value(&failed).unwrap();
    assert_eq!(json["error"]["code"], "unauthenticated");
}

#[test]
fn download_exports_owned_notes_only() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = session(&conn, "owner");
    let intruder = session(&conn, "intruder");
    let note_id = api::create_note(&mut conn, Some(owner.as_str()), "Trip/Plan", "pack bags")
        .note
        .unwrap()
        .id
        .to_string();

    let document =
        api::download_note(&mut conn, Some(owner.as_str()), &note_id, &PlainTextExporter).unwrap();
    assert_eq!(document.file_name, "Trip Plan.txt");
    assert!(String::from_utf8(document.bytes)
        .unwrap()
        .contains("pack bags"));

    let err = api::download_note(
        &mut conn,
        Some(intruder.as_str()),
        &note_id,
        &PlainTextExporter,
    )
    .unwrap_err();
    assert_eq!(err.code, "not_found");
}

#[test]
fn download_defaults_to_pdf_named_after_the_title() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = session(&conn, "owner");
    let note_id = api::create_note(&mut conn, Some(owner.as_str()), "Trip Plan", "pack bags")
        .note
        .unwrap()
        .id
        .to_string();

    let document =
        api::download_note(&mut conn, Some(owner.as_str()), &note_id, &PdfExporter).unwrap();
    assert_eq!(document.file_name, "Trip Plan.pdf");
    assert_eq!(document.content_type, "application/pdf");
    assert!(document.bytes.starts_with(b"%PDF-"));

    let err = api::download_note(&mut conn, None, &note_id, &PdfExporter).unwrap_err();
    assert_eq!(err.code, "unauthenticated");
}

#[test]
fn logout_and_whoami_follow_session_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let token = session(&conn, "u");

    let me = api::whoami(&conn, Some(token.as_str()));
    assert!(me.ok);
    assert_eq!(me.username.as_deref(), Some("u"));

    assert_eq!(api::logout(&conn, &token).deleted, 1);
    let after = api::whoami(&conn, Some(token.as_str()));
    assert!(!after.ok);
    assert_eq!(after.error.unwrap().code, "unauthenticated");

    let taken = api::signup(&conn, "u", "pw");
    assert_eq!(taken.error.unwrap().code, "username_taken");
    let wrong = api::login(&conn, "u", "bad");
    assert_eq!(wrong.error.unwrap().code, "invalid_credentials");
}
