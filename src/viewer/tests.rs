//! Tests for the data service.

use super::*;
use crate::config::Config;
use rusqlite::Connection;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn service() -> DataService {
    DataService::new(Config::default())
}

/// Builds a SQLite image with `sql` and returns its bytes.
fn sqlite_bytes(tmp: &TempDir, sql: &str) -> Vec<u8> {
    let path = tmp.path().join("fixture.sqlite");
    let _ = std::fs::remove_file(&path);
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(sql).unwrap();
    drop(conn);
    std::fs::read(&path).unwrap()
}

const PEOPLE: &str = "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, age INTEGER);
    INSERT INTO people (name, age) VALUES ('Ada', 36), ('Linus', 28), ('Grace', 45);
    CREATE TABLE notes (body TEXT);";

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

#[test]
fn test_connect_is_lazy_and_idempotent() {
    let service = service();
    assert!(!service.is_connected());

    service.connect().unwrap();
    let first = service.engine().unwrap();
    service.connect().unwrap();
    let second = service.engine().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(service.is_connected());
}

#[test]
fn test_concurrent_connect_bootstraps_once() {
    let service = Arc::new(service());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.engine().unwrap())
        })
        .collect();
    let engines: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(engines.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    // Eight threads plus the slot itself.
    assert_eq!(Arc::strong_count(&engines[0]), engines.len() + 1);
}

#[test]
fn test_load_sqlite() {
    let tmp = TempDir::new().unwrap();
    let service = service();
    let info = service
        .load_dataset("data/people.sqlite", &sqlite_bytes(&tmp, PEOPLE))
        .unwrap();

    assert_eq!(info.kind, DatasetKind::Sqlite);
    assert_eq!(info.original_path, "data/people.sqlite");
    assert!(info.import.is_none());
    assert_eq!(info.tables.len(), 2);
    assert_eq!(info.tables[0].name, "people");
    assert_eq!(info.tables[0].row_count, 3);
    assert_eq!(info.tables[0].columns, ["id", "name", "age"]);
    assert_eq!(info.tables[1].row_count, 0);
    assert_eq!(service.current(), Some(info));
}

#[test]
fn test_extension_is_case_insensitive() {
    let tmp = TempDir::new().unwrap();
    let service = service();
    let info = service
        .load_dataset("PEOPLE.DB", &sqlite_bytes(&tmp, PEOPLE))
        .unwrap();
    assert_eq!(info.kind, DatasetKind::Sqlite);
}

#[test]
fn test_unsupported_format_does_not_touch_engine() {
    let service = service();

    let err = service.load_dataset("data.csv", b"a,b\n1,2").unwrap_err();
    match &err {
        Error::UnsupportedFormat {
            extension,
            supported,
        } => {
            assert_eq!(extension, "csv");
            assert_eq!(supported, ".db, .sqlite, .sqlite3, .sql, .json");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!service.is_connected());
    assert!(service.current().is_none());
}

#[test]
fn test_corrupt_image_keeps_previous_dataset() {
    let tmp = TempDir::new().unwrap();
    let service = service();
    let before = service
        .load_dataset("people.sqlite", &sqlite_bytes(&tmp, PEOPLE))
        .unwrap();

    let err = service
        .load_dataset("broken.db", b"definitely not a sqlite header, just text")
        .unwrap_err();
    assert!(matches!(err, Error::CorruptDatabase { .. }));
    assert_eq!(err.class(), ErrorClass::LoadRejected);

    assert_eq!(service.current(), Some(before));
    let page = service.get_table_page("people", 0, None).unwrap();
    assert_eq!(page.rows.len(), 3);
}

#[test]
fn test_load_json_is_in_memory() {
    let service = service();
    let json = br#"{"users": [{"id": 1, "name": "Ada"}, {"id": 2, "name": "Linus"}]}"#;

    let info = service.load_dataset("users.json", json).unwrap();
    assert_eq!(info.kind, DatasetKind::Json);
    assert!(!service.is_connected());

    let page = service.get_table_page("users", 0, Some(1)).unwrap();
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.total_rows, 2);
    assert_eq!(page.rows[0].get("name"), Some(&text("Ada")));
}

#[test]
fn test_json_is_read_only() {
    let service = service();
    service
        .load_dataset("users.json", br#"{"users": [{"id": 1}]}"#)
        .unwrap();

    let err = service
        .apply_changes(
            "users",
            &[CellChange {
                row_index: 0,
                column_id: "id".to_string(),
                value: Value::Integer(2),
            }],
        )
        .unwrap_err();
    assert!(matches!(err, Error::UpdateFailed { .. }));
}

#[test]
fn test_load_dump_reports_import() {
    let service = service();
    let dump = "CREATE TABLE `a` (`id` int(11) NOT NULL);\n\
                CREATE TABLE `b` (`id` int(11) NOT NULL,, oops);\n\
                INSERT INTO `a` VALUES (1),(2);";

    let info = service.load_dataset("two.sql", dump.as_bytes()).unwrap();
    assert_eq!(info.kind, DatasetKind::SqlDump);
    assert_eq!(info.tables.len(), 1);
    assert_eq!(info.tables[0].row_count, 2);

    let report = info.import.unwrap();
    assert!(report.has_warnings());
    assert_eq!(report.warnings[0].table.as_deref(), Some("b"));
}

#[test]
fn test_paging() {
    let tmp = TempDir::new().unwrap();
    let service = service();
    service
        .load_dataset("people.sqlite", &sqlite_bytes(&tmp, PEOPLE))
        .unwrap();

    let first = service.get_table_page("people", 0, Some(2)).unwrap();
    assert_eq!(first.columns, ["id", "name", "age"]);
    assert_eq!(first.rows.len(), 2);
    assert_eq!(first.total_rows, 3);

    let second = service.get_table_page("people", 1, Some(2)).unwrap();
    assert_eq!(second.rows.len(), 1);
    assert_eq!(second.rows[0].get("name"), Some(&text("Grace")));

    let past_end = service.get_table_page("people", 5, Some(2)).unwrap();
    assert!(past_end.rows.is_empty());

    let defaulted = service.get_table_page("people", 0, None).unwrap();
    assert_eq!(defaulted.page_size, 100);
}

#[test]
fn test_page_errors() {
    let tmp = TempDir::new().unwrap();
    let service = service();

    let err = service.get_table_page("people", 0, None).unwrap_err();
    assert!(matches!(err, Error::NoDatasetLoaded));

    service
        .load_dataset("people.sqlite", &sqlite_bytes(&tmp, PEOPLE))
        .unwrap();
    let err = service.get_table_page("sqlite_master", 0, None).unwrap_err();
    assert!(matches!(err, Error::UnknownTable { .. }));
}

#[test]
fn test_apply_changes_exports_image() {
    let tmp = TempDir::new().unwrap();
    let service = service();
    service
        .load_dataset("dir/people.sqlite", &sqlite_bytes(&tmp, PEOPLE))
        .unwrap();

    let image = service
        .apply_changes(
            "people",
            &[
                CellChange {
                    row_index: 1,
                    column_id: "name".to_string(),
                    value: text("Linus T."),
                },
                CellChange {
                    row_index: 2,
                    column_id: "age".to_string(),
                    value: Value::Null,
                },
            ],
        )
        .unwrap();

    assert_eq!(image.file_name, "people.sqlite_updated");
    assert_eq!(image.mime_type, "application/x-sqlite3");
    assert!(image.bytes.starts_with(b"SQLite format 3\0"));

    let page = service.get_table_page("people", 0, None).unwrap();
    assert_eq!(page.rows[1].get("name"), Some(&text("Linus T.")));
    assert_eq!(page.rows[2].get("age"), Some(&Value::Null));

    // The exported image is a loadable dataset carrying the edit.
    let reloaded = DataService::new(service.config().clone());
    reloaded.load_dataset(&image.file_name.replace("_updated", ""), &image.bytes).unwrap();
    let page = reloaded.get_table_page("people", 0, None).unwrap();
    assert_eq!(page.rows[1].get("name"), Some(&text("Linus T.")));
}

#[test]
fn test_apply_changes_rolls_back_batch() {
    let tmp = TempDir::new().unwrap();
    let service = service();
    service
        .load_dataset("people.sqlite", &sqlite_bytes(&tmp, PEOPLE))
        .unwrap();

    let err = service
        .apply_changes(
            "people",
            &[
                CellChange {
                    row_index: 0,
                    column_id: "name".to_string(),
                    value: text("changed"),
                },
                CellChange {
                    row_index: 0,
                    column_id: "no_such_column".to_string(),
                    value: text("x"),
                },
            ],
        )
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Transactional);

    let page = service.get_table_page("people", 0, None).unwrap();
    assert_eq!(page.rows[0].get("name"), Some(&text("Ada")));
}

#[test]
fn test_apply_changes_errors() {
    let tmp = TempDir::new().unwrap();
    let service = service();
    let err = service.apply_changes("people", &[]).unwrap_err();
    assert!(matches!(err, Error::NoDatasetLoaded));

    service
        .load_dataset("people.sqlite", &sqlite_bytes(&tmp, PEOPLE))
        .unwrap();
    let err = service.apply_changes("missing", &[]).unwrap_err();
    assert!(matches!(err, Error::UpdateFailed { .. }));
}

#[test]
fn test_custom_export_suffix() {
    let tmp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.export.suffix = ".edited".to_string();
    let service = DataService::new(config);
    service
        .load_dataset("people.db", &sqlite_bytes(&tmp, PEOPLE))
        .unwrap();

    let image = service.apply_changes("people", &[]).unwrap();
    assert_eq!(image.file_name, "people.db.edited");
}

#[test]
fn test_close_keeps_engine() {
    let tmp = TempDir::new().unwrap();
    let service = service();
    service
        .load_dataset("people.sqlite", &sqlite_bytes(&tmp, PEOPLE))
        .unwrap();

    assert!(service.close());
    assert!(!service.close());
    assert!(service.current().is_none());
    assert!(service.is_connected());
}

#[test]
fn test_service_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DataService>();
}
