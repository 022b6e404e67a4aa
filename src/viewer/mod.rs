//! Tabular data viewer.
//!
//! Loads a dataset from raw bytes and a file name hint, pages through its
//! tables and applies cell edits as one transaction:
//!
//! - **SQLite images** (`.db`, `.sqlite`, `.sqlite3`) are opened as-is
//! - **SQL dumps** (`.sql`) are translated from the MySQL dialect and
//!   imported statement by statement, skipping what SQLite rejects
//! - **JSON table files** (`.json`) are read in memory and are read-only
//!
//! Engine-backed datasets live in a private in-memory copy; edits never
//! reach the source file and are handed back as an exported image.
//!
//! # Example
//!
//! ```ignore
//! use dbview::viewer::{CellChange, DataService, Value};
//!
//! let service = DataService::default();
//! service.load_dataset("shop.sqlite", &bytes)?;
//! let image = service.apply_changes("users", &[CellChange {
//!     row_index: 0,
//!     column_id: "name".into(),
//!     value: Value::Text("Ada".into()),
//! }])?;
//! assert_eq!(image.file_name, "shop.sqlite_updated");
//! ```

pub mod dump;
mod engine;
mod error;
mod json;
mod service;
mod sqlite;
mod types;

#[cfg(test)]
mod tests;

pub use error::{Error, ErrorClass, Result};
pub use service::DataService;
pub use types::{
    CellChange, DatasetInfo, DatasetKind, ExportedImage, ImportReport, ImportWarning, Row,
    TableDescriptor, TablePage, Value,
};
