//! The data access service.
//!
//! [`DataService`] owns the engine handle and the currently loaded dataset
//! and exposes load, page, edit and export operations. It is constructed
//! explicitly by the application root; there is no process-wide instance.

use super::dump;
use super::engine::Engine;
use super::error::{Error, Result};
use super::json::JsonTables;
use super::sqlite::SqliteStore;
use super::types::{CellChange, DatasetInfo, DatasetKind, ExportedImage, TablePage};
use crate::config::Config;
use crate::constants::{SQLITE_MIME_TYPE, SUPPORTED_EXTENSIONS};
use crate::utils::{export_file_name, extension_of};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// Loaded dataset metadata paired with the storage that backs it.
///
/// Both halves are replaced together, so table descriptors always match the
/// rows they describe.
struct Session {
    info: DatasetInfo,
    backing: Backing,
}

enum Backing {
    Engine(SqliteStore),
    Json(JsonTables),
}

/// Load, browse, edit and export tabular datasets.
///
/// # Thread Safety
///
/// `DataService` is `Send + Sync`. The engine slot and the session sit
/// behind separate mutexes; paging and edits hold the session lock for
/// their whole duration, so edit batches never interleave.
///
/// # Example
///
/// ```ignore
/// use dbview::config::Config;
/// use dbview::viewer::DataService;
///
/// let service = DataService::new(Config::default());
/// let info = service.load_dataset("shop.sql", &bytes)?;
/// let page = service.get_table_page(&info.tables[0].name, 0, None)?;
/// ```
pub struct DataService {
    config: Config,
    engine: Mutex<Option<Arc<Engine>>>,
    session: Mutex<Option<Session>>,
}

impl Default for DataService {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl DataService {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            engine: Mutex::new(None),
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bootstraps the engine if needed.
    ///
    /// Idempotent. Concurrent first callers block on the engine lock and
    /// share one bootstrap. A failed bootstrap leaves the slot empty so the
    /// next call retries.
    ///
    /// # Errors
    ///
    /// Returns `EngineUnavailable` if bootstrap fails.
    pub fn connect(&self) -> Result<()> {
        self.engine().map(drop)
    }

    pub(crate) fn engine(&self) -> Result<Arc<Engine>> {
        let mut slot = self.engine.lock();
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }

        let engine = Arc::new(Engine::bootstrap()?);
        debug!(sqlite = engine.version(), "engine connected");
        *slot = Some(Arc::clone(&engine));
        Ok(engine)
    }

    pub fn is_connected(&self) -> bool {
        self.engine.lock().is_some()
    }

    /// Loads `bytes` as the new current dataset.
    ///
    /// `path` is only used to pick the loader by extension and to name the
    /// export; the file system is never touched. The new dataset is built
    /// in full before it replaces the old one, so any error leaves the
    /// previous dataset loaded.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` for an unknown extension, before the engine is
    ///   touched
    /// - `EngineUnavailable` if the engine cannot be bootstrapped
    /// - `CorruptDatabase`, `MalformedJson` or `NoTablesCreated` if the
    ///   bytes cannot be loaded
    pub fn load_dataset(&self, path: &str, bytes: &[u8]) -> Result<DatasetInfo> {
        let extension = extension_of(path);
        let Some(kind) = DatasetKind::from_extension(&extension) else {
            return Err(Error::UnsupportedFormat {
                extension,
                supported: supported_extensions(),
            });
        };
        debug!(path, %kind, bytes = bytes.len(), "loading dataset");

        let (backing, tables, import) = match kind {
            DatasetKind::Sqlite => {
                let (store, tables) = SqliteStore::ingest(&*self.engine()?, path, bytes)?;
                (Backing::Engine(store), tables, None)
            }
            DatasetKind::Json => {
                let (store, tables) = JsonTables::ingest(path, bytes)?;
                (Backing::Json(store), tables, None)
            }
            DatasetKind::SqlDump => {
                let (store, tables, report) = dump::import(&*self.engine()?, path, bytes)?;
                (Backing::Engine(store), tables, Some(report))
            }
        };

        let info = DatasetInfo {
            tables,
            original_path: path.to_string(),
            kind,
            import,
        };
        let session = Session {
            info: info.clone(),
            backing,
        };

        let previous = self.session.lock().replace(session);
        info!(
            path,
            %kind,
            tables = info.tables.len(),
            replaced = previous.is_some(),
            "dataset loaded"
        );
        drop(previous);

        Ok(info)
    }

    /// Metadata of the current dataset, if any.
    pub fn current(&self) -> Option<DatasetInfo> {
        self.session.lock().as_ref().map(|s| s.info.clone())
    }

    /// Unloads the current dataset. The engine stays connected.
    ///
    /// Returns whether a dataset was loaded.
    pub fn close(&self) -> bool {
        let previous = self.session.lock().take();
        if let Some(session) = &previous {
            debug!(path = %session.info.original_path, "dataset closed");
        }
        previous.is_some()
    }

    /// Reads one page of `table`.
    ///
    /// `page_size` defaults to `viewer.page_size` from the configuration.
    ///
    /// # Errors
    ///
    /// Returns `NoDatasetLoaded`, `UnknownTable` if `table` is not part of
    /// the dataset, or `QueryFailed` with the engine message.
    pub fn get_table_page(
        &self,
        table: &str,
        page: usize,
        page_size: Option<usize>,
    ) -> Result<TablePage> {
        let page_size = page_size.unwrap_or(self.config.viewer.page_size);

        let guard = self.session.lock();
        let session = guard.as_ref().ok_or(Error::NoDatasetLoaded)?;
        let descriptor = session
            .info
            .table(table)
            .ok_or_else(|| Error::unknown_table(table))?;

        match &session.backing {
            Backing::Engine(store) => store.page(descriptor, page, page_size),
            Backing::Json(store) => store.page(descriptor, page, page_size),
        }
    }

    /// Applies `changes` to `table` in one transaction and exports the
    /// resulting image.
    ///
    /// # Errors
    ///
    /// Returns `NoDatasetLoaded`, or `UpdateFailed` if the table is unknown,
    /// the dataset is a read-only JSON file, any change fails or the image
    /// cannot be exported. A failed batch leaves no change behind.
    pub fn apply_changes(&self, table: &str, changes: &[CellChange]) -> Result<ExportedImage> {
        let mut guard = self.session.lock();
        let session = guard.as_mut().ok_or(Error::NoDatasetLoaded)?;
        if session.info.table(table).is_none() {
            return Err(Error::update_failed(table, "no such table in the loaded dataset"));
        }

        let store = match &mut session.backing {
            Backing::Engine(store) => store,
            Backing::Json(_) => {
                return Err(Error::update_failed(table, "JSON datasets are read-only"));
            }
        };

        let bytes = store.apply_changes(table, changes)?;

        Ok(ExportedImage {
            file_name: export_file_name(&session.info.original_path, &self.config.export.suffix),
            mime_type: SQLITE_MIME_TYPE,
            bytes,
        })
    }
}

fn supported_extensions() -> String {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(", ")
}
