mod common;

use checkin::config::{Config, StoreBackend};
use checkin::downloader::{EXPORT_FILENAME, escape_field, header_row, to_csv};
use checkin::loader::from_csv;
use checkin::response::Response;
use checkin::store::{self, CsvStore, MemoryStore, ResponseStore};
use common::response;
use std::fs;
use tempfile::tempdir;

fn tricky_response() -> Response {
    let mut tricky = response("O'Brien, \"Pat\"", 45, "Ireland", "");
    tricky.how_found_us = Some("A friend said:\n\"come along\"".to_string());
    tricky
}

fn exercise_store(store: &dyn ResponseStore) {
    assert!(store.scan_all().unwrap().is_empty(), "New store should be empty");

    let first = response("Alice", 30, "United States", "Virginia");
    let second = tricky_response();
    store.insert(&first).unwrap();
    store.insert(&second).unwrap();

    let rows = store.scan_all().unwrap();
    assert_eq!(rows, vec![first, second], "Rows should come back in insertion order");

    store.delete_all().unwrap();
    assert!(store.scan_all().unwrap().is_empty(), "Store should be empty after delete_all");

    // Still writable after a clear
    store.insert(&response("Bob", 12, "Canada", "")).unwrap();
    assert_eq!(store.scan_all().unwrap().len(), 1);
}

#[test]
fn test_memory_store() {
    exercise_store(&MemoryStore::new());
}

#[test]
fn test_csv_store() {
    let dir = tempdir().unwrap();
    let store = CsvStore::open(dir.path().join("nested").join("responses.csv")).unwrap();

    exercise_store(&store);
}

#[test]
fn test_csv_store_file_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("responses.csv");
    let store = CsvStore::open(&path).unwrap();

    // Header is written on open
    assert_eq!(fs::read_to_string(&path).unwrap(), header_row());

    store.insert(&response("Alice", 30, "United States", "Virginia")).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "name,ageRange,age,local,country,state,christFollower,faithDecision,howYouFoundUs\n\
         Alice,25-40,30,false,United States,Virginia,Yes,Yes,\n"
    );

    store.delete_all().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), header_row(), "Clear keeps the header");
}

#[test]
fn test_csv_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("responses.csv");

    {
        let store = CsvStore::open(&path).unwrap();
        store.insert(&tricky_response()).unwrap();
    }

    let reopened = CsvStore::open(&path).unwrap();
    assert_eq!(reopened.scan_all().unwrap(), vec![tricky_response()]);
}

#[test]
fn test_csv_store_reports_corrupt_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("responses.csv");
    fs::write(&path, "who,what\nx,y\n").unwrap();

    let store = CsvStore::open(&path).unwrap();
    assert!(store.scan_all().is_err(), "A foreign header must be rejected");
}

#[cfg(feature = "sqlite")]
#[test]
fn test_sqlite_store() {
    use checkin::store::SqliteStore;

    let dir = tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("responses.sqlite")).unwrap();

    exercise_store(&store);
}

#[cfg(feature = "sqlite")]
#[test]
fn test_sqlite_store_in_memory() {
    use checkin::store::SqliteStore;

    exercise_store(&SqliteStore::open_in_memory().unwrap());
}

#[test]
fn test_open_selects_backend() {
    let dir = tempdir().unwrap();
    let config = Config {
        store: StoreBackend::Csv,
        store_path: dir.path().join("responses.csv"),
        ..Config::default()
    };

    let store = store::open(&config).unwrap();
    store.insert(&response("Alice", 30, "United States", "Virginia")).unwrap();
    assert!(dir.path().join("responses.csv").exists());

    let memory = store::open(&Config {
        store: StoreBackend::Memory,
        ..Config::default()
    })
    .unwrap();
    assert!(memory.scan_all().unwrap().is_empty());
}

#[test]
fn test_export_quotes_only_when_needed() {
    assert_eq!(escape_field("plain"), "plain");
    assert_eq!(escape_field("a,b"), "\"a,b\"");
    assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    assert_eq!(EXPORT_FILENAME, "responses.csv");
}

#[test]
fn test_export_round_trips_through_loader() {
    let rows = vec![response("Alice", 30, "United States", "Virginia"), tricky_response()];
    let csv = to_csv(&rows);

    assert!(csv.starts_with(&header_row()));
    assert!(csv.contains("\"O'Brien, \"\"Pat\"\"\""));
    assert_eq!(from_csv(&csv).unwrap(), rows);
}

#[test]
fn test_loader_accepts_empty_and_blank_lines() {
    assert!(from_csv("").unwrap().is_empty());

    let csv = format!("{}\nAlice,25-40,30,false,United States,Virginia,Yes,No,\n\n", header_row());
    let rows = from_csv(&csv).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Alice");
}

#[test]
fn test_loader_rejects_bad_rows() {
    let csv = format!("{}Alice,25-40,thirty,false,United States,,Yes,No,\n", header_row());
    let err = from_csv(&csv).unwrap_err();
    assert!(err.to_string().contains("Row 1"), "Error should name the row: {}", err);
}
