//! Shared fixtures for the integration tests.
//!
//! Every test gets its own service and temp directory for fixture files.

#![allow(dead_code)]

use dbview::config::Config;
use dbview::viewer::{DataService, TablePage, Value};
use rusqlite::Connection;
use std::path::PathBuf;
use tempfile::TempDir;

/// A service rooted in a private temp directory.
pub struct Fixture {
    pub dir: TempDir,
    pub service: DataService,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
            service: DataService::new(Config::default()),
        }
    }

    /// Write a SQLite database built from `sql` and return its path.
    pub fn sqlite_file(&self, name: &str, sql: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        let conn = Connection::open(&path).expect("Failed to create fixture database");
        conn.execute_batch(sql).expect("Failed to populate fixture database");
        path
    }

    /// Bytes of a SQLite database built from `sql`.
    pub fn sqlite_bytes(&self, name: &str, sql: &str) -> Vec<u8> {
        let path = self.sqlite_file(name, sql);
        std::fs::read(path).expect("Failed to read fixture database")
    }
}

/// Fixture schema: ten rows, so row indexes 0..9 map to rowids 1..10.
pub const TEN_ROWS: &str = "
    CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT NOT NULL, qty INTEGER, price REAL);
    WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 10)
    INSERT INTO items (label, qty, price) SELECT 'item-' || i, i * 2, i * 1.5 FROM n;
    CREATE TABLE tags (name TEXT, item_id INTEGER);
    INSERT INTO tags VALUES ('red', 1), ('blue', 2), (NULL, 3);
    CREATE TABLE empty (x BLOB);
";

/// Every row of a page as positional values.
pub fn values(page: &TablePage) -> Vec<Vec<Value>> {
    page.rows.iter().map(|row| row.values.clone()).collect()
}
