//! Embedded engine lifecycle.
//!
//! The engine is SQLite linked through rusqlite. Bootstrapping verifies the
//! linked library; every loaded dataset then lives in its own in-memory
//! image. Caller bytes are deserialized straight into that image, so no
//! file is read, written or left behind.

use super::error::{Error, Result};
use crate::constants;
use rusqlite::{Connection, MAIN_DB};
use std::borrow::Cow;
use tracing::{debug, info};

/// Magic string at the start of every SQLite image.
const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

/// A bootstrapped engine.
#[derive(Debug)]
pub(crate) struct Engine {
    version: &'static str,
}

impl Engine {
    /// Bootstraps the engine.
    ///
    /// # Errors
    ///
    /// Returns `EngineUnavailable` if the linked SQLite is too old to
    /// serialize databases.
    pub fn bootstrap() -> Result<Self> {
        Self::bootstrap_with(constants::MIN_SQLITE_VERSION)
    }

    pub(crate) fn bootstrap_with(min_version: i32) -> Result<Self> {
        if rusqlite::version_number() < min_version {
            return Err(Error::engine_unavailable(format!(
                "SQLite {} is too old (3.36.0 or newer required)",
                rusqlite::version()
            )));
        }

        info!(sqlite = rusqlite::version(), "database engine ready");
        Ok(Self {
            version: rusqlite::version(),
        })
    }

    pub fn version(&self) -> &str {
        self.version
    }

    /// Opens `bytes` as a writable in-memory database.
    ///
    /// The image is not validated here; SQLite reads the header on the first
    /// query. Empty input opens an empty database, as SQLite does for an
    /// empty file.
    pub fn open_image(&self, source: &str, bytes: &[u8]) -> Result<Connection> {
        let mut conn = Connection::open_in_memory().map_err(|e| Error::corrupt(source, e))?;
        if !bytes.is_empty() {
            let image = without_wal_mode(bytes);
            let data: &[u8] = &image;
            conn.deserialize_read_exact(MAIN_DB, data, data.len(), false)
                .map_err(|e| Error::corrupt(source, e))?;
        }
        debug!(source, bytes = bytes.len(), "opened database image");
        Ok(conn)
    }

    /// Creates an empty in-memory database.
    pub fn create_image(&self, source: &str) -> Result<Connection> {
        let conn = Connection::open_in_memory().map_err(|e| Error::corrupt(source, e))?;
        debug!(source, "created in-memory database");
        Ok(conn)
    }
}

/// Rewrites the header of a WAL-mode image to rollback-journal mode.
///
/// An in-memory image has no `-wal` file beside it, and SQLite refuses to
/// read a deserialized image whose header still asks for one. Anything
/// that is not a WAL-mode header is passed through untouched.
fn without_wal_mode(bytes: &[u8]) -> Cow<'_, [u8]> {
    let is_wal = bytes.starts_with(SQLITE_HEADER)
        && bytes.len() > 19
        && (bytes[18] == 2 || bytes[19] == 2);
    if !is_wal {
        return Cow::Borrowed(bytes);
    }

    let mut owned = bytes.to_vec();
    owned[18] = 1;
    owned[19] = 1;
    Cow::Owned(owned)
}

/// Serializes the main database of `conn` into a standalone image.
pub(crate) fn export_image(conn: &Connection) -> rusqlite::Result<Vec<u8>> {
    conn.serialize(MAIN_DB).map(|data| data.to_vec())
}
