//! CLI command implementations for dbview.
//!
//! Each submodule implements one command:
//!
//! - [`tables`] - List the tables of a dataset
//! - [`page`] - Print one page of a table
//! - [`apply`] - Apply cell edits and write the exported database
//!
//! Commands are the file-system side of the viewer: they read the dataset
//! bytes, hand them to [`DataService`] and write whatever it exports.

pub mod apply;
pub mod page;
pub mod tables;

use anyhow::{Context, Result};
use dbview::viewer::{DataService, DatasetInfo};
use std::fs;
use std::path::Path;

/// Read `file` and load it into `service`.
pub fn load_file(service: &DataService, file: &Path) -> Result<DatasetInfo> {
    let bytes =
        fs::read(file).with_context(|| format!("Failed to read dataset: {}", file.display()))?;
    let info = service.load_dataset(&file.to_string_lossy(), &bytes)?;
    Ok(info)
}
