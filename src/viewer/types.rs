//! Type definitions for the data viewer.
//!
//! Contains the scalar values, rows and dataset metadata shared by every
//! ingestion path (SQLite image, SQL dump, JSON table file).

use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};

/// Scalar cell values as produced by the engine or a JSON table file.
///
/// Mirrors SQLite's storage classes. All types are JSON-serializable so
/// pages can be handed to a UI layer unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// SQL NULL value
    Null,
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Real(f64),
    /// UTF-8 text string
    Text(String),
    /// Binary blob data
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for Value {
    fn from(value_ref: ValueRef<'_>) -> Self {
        match value_ref {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(r) => Self::Real(r),
            ValueRef::Text(t) => Self::Text(String::from_utf8_lossy(t).to_string()),
            ValueRef::Blob(b) => Self::Blob(b.to_vec()),
        }
    }
}

impl From<&serde_json::Value> for Value {
    /// Flattens a JSON cell into a scalar.
    ///
    /// Booleans become 0/1 integers; nested arrays and objects are kept as
    /// their JSON text.
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Integer(i64::from(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map_or(Self::Null, Self::Real),
            },
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl Value {
    /// Converts to a rusqlite Value for parameter binding.
    pub fn to_rusqlite(&self) -> rusqlite::types::Value {
        match self {
            Self::Null => rusqlite::types::Value::Null,
            Self::Integer(i) => rusqlite::types::Value::Integer(*i),
            Self::Real(r) => rusqlite::types::Value::Real(*r),
            Self::Text(s) => rusqlite::types::Value::Text(s.clone()),
            Self::Blob(b) => rusqlite::types::Value::Blob(b.clone()),
        }
    }

    /// Short human-readable rendering used by the terminal table view.
    pub fn display(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Real(r) => r.to_string(),
            Self::Text(s) => s.clone(),
            Self::Blob(b) => format!("<blob {} bytes>", b.len()),
        }
    }
}

/// A single record of a table page.
///
/// Values are positional against `columns`; use [`Row::get`] for by-name
/// access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Row {
    /// Column names in order
    pub columns: Vec<String>,
    /// Values in same order as columns
    pub values: Vec<Value>,
}

impl Row {
    /// Creates a new row with the given columns and values.
    ///
    /// # Panics
    ///
    /// Panics if `columns.len()` != `values.len()`. This validation runs in
    /// both debug and release builds to prevent data corruption.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Column count ({}) must match value count ({})",
            columns.len(),
            values.len()
        );
        Self { columns, values }
    }

    /// Gets a value by column name, returning None if not found.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }
}

/// Which read/write path a loaded dataset uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetKind {
    /// Native SQLite image (`.db`, `.sqlite`, `.sqlite3`).
    Sqlite,
    /// Flat record-list JSON (`.json`).
    Json,
    /// MySQL-style text dump translated on load (`.sql`).
    SqlDump,
}

impl DatasetKind {
    /// Resolves a kind from a lowercased file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "db" | "sqlite" | "sqlite3" => Some(Self::Sqlite),
            "json" => Some(Self::Json),
            "sql" => Some(Self::SqlDump),
            _ => None,
        }
    }

    /// Whether rows for this kind live in the embedded engine.
    pub const fn is_engine_backed(self) -> bool {
        match self {
            Self::Sqlite | Self::SqlDump => true,
            Self::Json => false,
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Sqlite => "sqlite",
            Self::Json => "json",
            Self::SqlDump => "sql-dump",
        })
    }
}

/// Summary metadata for one relation of the loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    pub name: String,
    /// Cardinality at introspection time; not live-updated.
    pub row_count: u64,
    pub columns: Vec<String>,
}

/// A statement the dump importer skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportWarning {
    /// Table the statement targeted, when one could be extracted.
    pub table: Option<String>,
    /// Leading part of the offending statement.
    pub statement: String,
    /// Engine or translator message.
    pub message: String,
}

/// Outcome of a dump import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Top-level statements found after comment stripping.
    pub statements: usize,
    /// Session/transaction no-ops dropped before translation.
    pub skipped: usize,
    /// Tables created in pass 1, in creation order.
    pub tables_created: Vec<String>,
    /// INSERT statements that executed successfully.
    pub inserts_applied: usize,
    pub warnings: Vec<ImportWarning>,
}

impl ImportReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Metadata describing the currently loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    pub tables: Vec<TableDescriptor>,
    pub original_path: String,
    pub kind: DatasetKind,
    /// Present for SQL dumps only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportReport>,
}

impl DatasetInfo {
    /// Looks up a table descriptor by name.
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// One window of rows from a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePage {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub page: usize,
    pub page_size: usize,
    /// Row count of the table descriptor, for page navigation.
    pub total_rows: u64,
}

/// A single pending cell edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellChange {
    /// Zero-based row index; addresses `rowid = row_index + 1`.
    pub row_index: u64,
    pub column_id: String,
    pub value: Value,
}

/// Database image produced after a committed edit batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    /// Suggested download name, e.g. `foo.sqlite_updated`.
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}
