//! Shared constants for dbview.

/// Rows per page when the caller does not ask for a size.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Page sizes above this trigger a configuration warning.
pub const LARGE_PAGE_SIZE: usize = 10_000;

/// Suffix appended to the source file name of an exported image.
pub const EXPORT_SUFFIX: &str = "_updated";

/// MIME type of an exported database image.
pub const SQLITE_MIME_TYPE: &str = "application/x-sqlite3";

/// Extensions the loader accepts, in the order they are reported.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["db", "sqlite", "sqlite3", "sql", "json"];

/// Configuration file looked up in the current directory.
pub const CONFIG_FILE: &str = "dbview.toml";

/// Directory name used under the user config dir.
pub const APP_DIR_NAME: &str = "dbview";

/// Oldest SQLite that builds serialize/deserialize by default (3.36.0).
pub const MIN_SQLITE_VERSION: i32 = 3_036_000;

/// Characters of a failing statement kept in an import warning.
pub const WARNING_STATEMENT_PREVIEW: usize = 80;
