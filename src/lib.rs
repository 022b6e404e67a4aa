//! dbview - load, browse, edit and export tabular datasets.
//!
//! The library half of the `dbview` binary. The core is
//! [`viewer::DataService`], which ingests SQLite images, MySQL-style SQL
//! dumps and JSON table files from raw bytes, pages through their tables and
//! applies cell edits transactionally.
//!
//! - [`viewer`] - Data access service, dump translation, engine lifecycle
//! - [`config`] - `dbview.toml` loading and validation
//! - [`constants`] - Shared defaults
//! - [`utils`] - Path-hint and formatting helpers

pub mod config;
pub mod constants;
pub mod utils;
pub mod viewer;
