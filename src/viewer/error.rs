//! Error types for the data viewer.
//!
//! Every failure a caller can observe is a variant here, grouped by
//! [`ErrorClass`] so the UI layer can decide whether the previous dataset is
//! still authoritative and whether a retry makes sense.

/// Result type for viewer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// How a failure affects service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Engine bootstrap failed; a later call may succeed.
    Retryable,
    /// The load was abandoned; the previous dataset is still loaded.
    LoadRejected,
    /// A read failed; nothing changed.
    Query,
    /// An edit batch was rolled back as a whole.
    Transactional,
    /// The call was made in the wrong state.
    Usage,
}

/// Viewer errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Engine bootstrap failed.
    #[error("database engine unavailable: {reason}")]
    EngineUnavailable { reason: String },

    /// File extension is not one the loader understands.
    #[error("unsupported file format '{extension}'. Supported formats: {supported}")]
    UnsupportedFormat {
        extension: String,
        supported: String,
    },

    /// The bytes are not a readable SQLite image.
    #[error("failed to load SQLite database '{path}': {reason}")]
    CorruptDatabase { path: String, reason: String },

    /// The bytes are not a JSON object of table arrays.
    #[error("failed to load JSON file '{path}': {reason}")]
    MalformedJson { path: String, reason: String },

    /// A dump import produced no usable table.
    #[error("no tables could be created from '{path}' ({failed} statements failed)")]
    NoTablesCreated { path: String, failed: usize },

    /// Paging or editing was requested before any successful load.
    #[error("no database loaded")]
    NoDatasetLoaded,

    /// The table is not part of the loaded dataset.
    #[error("unknown table: {name}")]
    UnknownTable { name: String },

    /// The engine rejected a read.
    #[error("failed to get data for table '{table}': {reason}")]
    QueryFailed { table: String, reason: String },

    /// An edit batch failed and was rolled back.
    #[error("failed to save changes to table '{table}': {reason}")]
    UpdateFailed { table: String, reason: String },
}

impl Error {
    /// Create an engine unavailable error.
    pub fn engine_unavailable(reason: impl Into<String>) -> Self {
        Self::EngineUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a corrupt database error.
    pub fn corrupt(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::CorruptDatabase {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an unknown table error.
    pub fn unknown_table(name: impl Into<String>) -> Self {
        Self::UnknownTable { name: name.into() }
    }

    /// Create a query failed error.
    pub fn query_failed(table: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::QueryFailed {
            table: table.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an update failed error.
    pub fn update_failed(table: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::UpdateFailed {
            table: table.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify this error by its effect on service state.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::EngineUnavailable { .. } => ErrorClass::Retryable,
            Self::UnsupportedFormat { .. }
            | Self::CorruptDatabase { .. }
            | Self::MalformedJson { .. }
            | Self::NoTablesCreated { .. } => ErrorClass::LoadRejected,
            Self::UnknownTable { .. } | Self::QueryFailed { .. } => ErrorClass::Query,
            Self::UpdateFailed { .. } => ErrorClass::Transactional,
            Self::NoDatasetLoaded => ErrorClass::Usage,
        }
    }
}
