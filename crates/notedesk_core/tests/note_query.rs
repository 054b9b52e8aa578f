use notedesk_core::db::open_db_in_memory;
use notedesk_core::{
    Note, NoteError, NoteQueryEngine, NoteRepository, Page, SqliteNoteRepository,
    MONTH_WINDOW_MS, THREE_MONTHS_WINDOW_MS,
};
use rusqlite::Connection;
use std::collections::HashSet;

const NOW: i64 = 1_700_000_000_000;
const DAY_MS: i64 = 86_400_000;
const OWNER: &str = "user-1";

fn seed(conn: &mut Connection, owner: &str, title: &str, age_ms: i64, archived: bool) -> Note {
    let repo = SqliteNoteRepository::try_new(conn).unwrap();
    let mut note = Note::new(owner, title, "body", NOW - age_ms);
    note.archived = archived;
    repo.insert_note(&note).unwrap();
    note
}

fn titles(conn: &mut Connection, bucket: &str, page: i64) -> Vec<String> {
    let engine = NoteQueryEngine::new(SqliteNoteRepository::try_new(conn).unwrap());
    engine
        .list_notes_at(Some(OWNER), bucket, Page::new(page), NOW)
        .unwrap()
        .notes
        .into_iter()
        .map(|note| note.title)
        .collect()
}

#[test]
fn one_month_bucket_returns_only_recent_active_notes() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, OWNER, "recent", 10 * DAY_MS, false);
    seed(&mut conn, OWNER, "old", 40 * DAY_MS, false);
    seed(&mut conn, OWNER, "recent archived", 5 * DAY_MS, true);

    assert_eq!(titles(&mut conn, "1month", 1), vec!["recent"]);
}

#[test]
fn three_month_window_is_three_times_the_month_window() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, OWNER, "edge-in", THREE_MONTHS_WINDOW_MS - 1, false);
    seed(&mut conn, OWNER, "edge-out", THREE_MONTHS_WINDOW_MS, false);
    seed(&mut conn, OWNER, "mid", MONTH_WINDOW_MS + DAY_MS, false);

    assert_eq!(titles(&mut conn, "3months", 1), vec!["mid", "edge-in"]);
    assert_eq!(
        titles(&mut conn, "alltime", 1),
        vec!["mid", "edge-in", "edge-out"]
    );
    assert!(titles(&mut conn, "1month", 1).is_empty());
}

#[test]
fn archive_bucket_ignores_age() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, OWNER, "ancient archived", 400 * DAY_MS, true);
    seed(&mut conn, OWNER, "fresh archived", DAY_MS, true);
    seed(&mut conn, OWNER, "active", DAY_MS, false);

    assert_eq!(
        titles(&mut conn, "archive", 1),
        vec!["fresh archived", "ancient archived"]
    );
}

#[test]
fn listing_is_newest_first_and_renders_display_date() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, OWNER, "older", 3 * DAY_MS, false);
    seed(&mut conn, OWNER, "newest", 0, false);
    seed(&mut conn, OWNER, "middle", DAY_MS, false);

    let engine = NoteQueryEngine::new(SqliteNoteRepository::try_new(&mut conn).unwrap());
    let listed = engine
        .list_notes_at(Some(OWNER), "alltime", Page::FIRST, NOW)
        .unwrap();
    let order: Vec<&str> = listed.notes.iter().map(|note| note.title.as_str()).collect();
    assert_eq!(order, vec!["newest", "middle", "older"]);
    // NOW is 2023-11-14T22:13:20Z.
    assert_eq!(listed.notes[0].created, "14/11/2023");
    assert!(!listed.has_more);
}

#[test]
fn pages_are_disjoint_and_has_more_tracks_full_pages() {
    let mut conn = open_db_in_memory().unwrap();
    for idx in 0..25 {
        seed(&mut conn, OWNER, &format!("note {idx}"), idx * 1000, false);
    }

    let engine = NoteQueryEngine::new(SqliteNoteRepository::try_new(&mut conn).unwrap());
    let first = engine
        .list_notes_at(Some(OWNER), "alltime", Page::new(1), NOW)
        .unwrap();
    let second = engine
        .list_notes_at(Some(OWNER), "alltime", Page::new(2), NOW)
        .unwrap();
    let third = engine
        .list_notes_at(Some(OWNER), "alltime", Page::new(3), NOW)
        .unwrap();

    assert_eq!(first.notes.len(), 10);
    assert!(first.has_more);
    assert_eq!(second.notes.len(), 10);
    assert!(second.has_more);
    assert_eq!(third.notes.len(), 5);
    assert!(!third.has_more);

    let first_ids: HashSet<_> = first.notes.iter().map(|note| note.id).collect();
    assert!(second.notes.iter().all(|note| !first_ids.contains(&note.id)));
    assert_eq!(first.notes[0].title, "note 0");
    assert_eq!(second.notes[0].title, "note 10");
}

#[test]
fn has_more_is_a_full_page_heuristic() {
    let mut conn = open_db_in_memory().unwrap();
    for idx in 0..10 {
        seed(&mut conn, OWNER, &format!("note {idx}"), idx * 1000, false);
    }

    let engine = NoteQueryEngine::new(SqliteNoteRepository::try_new(&mut conn).unwrap());
    let first = engine
        .list_notes_at(Some(OWNER), "alltime", Page::FIRST, NOW)
        .unwrap();
    assert!(first.has_more);

    let second = engine
        .list_notes_at(Some(OWNER), "alltime", Page::new(2), NOW)
        .unwrap();
    assert!(second.notes.is_empty());
    assert!(!second.has_more);
}

#[test]
fn page_numbers_below_one_clamp_to_first_page() {
    let mut conn = open_db_in_memory().unwrap();
    for idx in 0..12 {
        seed(&mut conn, OWNER, &format!("note {idx}"), idx * 1000, false);
    }

    assert_eq!(titles(&mut conn, "alltime", 0), titles(&mut conn, "alltime", 1));
    assert_eq!(titles(&mut conn, "alltime", -3), titles(&mut conn, "alltime", 1));
}

#[test]
fn listing_never_leaks_other_users_notes() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, OWNER, "mine", DAY_MS, false);
    seed(&mut conn, "user-2", "theirs", DAY_MS, false);
    seed(&mut conn, "user-2", "theirs archived", DAY_MS, true);

    assert_eq!(titles(&mut conn, "alltime", 1), vec!["mine"]);
    assert!(titles(&mut conn, "archive", 1).is_empty());
}

#[test]
fn unknown_bucket_and_missing_user_are_typed_failures() {
    let mut conn = open_db_in_memory().unwrap();
    let engine = NoteQueryEngine::new(SqliteNoteRepository::try_new(&mut conn).unwrap());

    let err = engine
        .list_notes_at(Some(OWNER), "week", Page::FIRST, NOW)
        .unwrap_err();
    assert!(matches!(err, NoteError::InvalidBucket(_)));
    assert_eq!(err.code(), "invalid_bucket");

    let err = engine.list_notes(None, "alltime", Page::FIRST).unwrap_err();
    assert!(matches!(err, NoteError::Unauthenticated));

    let err = engine.search_notes(Some(""), "a").unwrap_err();
    assert!(matches!(err, NoteError::Unauthenticated));
}

#[test]
fn search_is_case_insensitive_on_titles_across_both_partitions() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, OWNER, "Shopping List", 2 * DAY_MS, false);
    seed(&mut conn, OWNER, "old shopping", 400 * DAY_MS, true);
    seed(&mut conn, OWNER, "Work", DAY_MS, false);
    seed(&mut conn, "user-2", "shopping too", DAY_MS, false);

    let engine = NoteQueryEngine::new(SqliteNoteRepository::try_new(&mut conn).unwrap());
    let hits: Vec<String> = engine
        .search_notes(Some(OWNER), "SHOP")
        .unwrap()
        .into_iter()
        .map(|note| note.title)
        .collect();
    assert_eq!(hits, vec!["Shopping List", "old shopping"]);

    // Text is never searched; every seeded note has text "body".
    assert!(engine.search_notes(Some(OWNER), "body").unwrap().is_empty());
}

#[test]
fn search_folds_case_beyond_ascii() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, OWNER, "Заметка о покупках", DAY_MS, false);
    seed(&mut conn, OWNER, "Ärger im Büro", 2 * DAY_MS, true);
    seed(&mut conn, OWNER, "ΣΗΜΕΙΩΣΗ", 3 * DAY_MS, false);

    let engine = NoteQueryEngine::new(SqliteNoteRepository::try_new(&mut conn).unwrap());
    let search = |term: &str| -> Vec<String> {
        engine
            .search_notes(Some(OWNER), term)
            .unwrap()
            .into_iter()
            .map(|note| note.title)
            .collect()
    };

    assert_eq!(search("заметка"), vec!["Заметка о покупках"]);
    assert_eq!(search("ПОКУПКАХ"), vec!["Заметка о покупках"]);
    assert_eq!(search("ärger"), vec!["Ärger im Büro"]);
    assert_eq!(search("BÜRO"), vec!["Ärger im Büro"]);
    assert_eq!(search("σημ"), vec!["ΣΗΜΕΙΩΣΗ"]);
    assert!(search("zz").is_empty());
}

#[test]
fn search_treats_wildcards_literally_and_rejects_blank_terms() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, OWNER, "100% done", DAY_MS, false);
    seed(&mut conn, OWNER, "plain", DAY_MS, false);

    let engine = NoteQueryEngine::new(SqliteNoteRepository::try_new(&mut conn).unwrap());
    let hits = engine.search_notes(Some(OWNER), "%").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "100% done");
    assert!(engine.search_notes(Some(OWNER), "_").unwrap().is_empty());

    let err = engine.search_notes(Some(OWNER), "   ").unwrap_err();
    assert_eq!(err.code(), "validation_error");
}
