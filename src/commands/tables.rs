//! `dbview tables` - list the tables of a dataset.

use anyhow::Result;
use dbview::viewer::DataService;
use std::path::Path;

use crate::ui;

/// Execute the tables command.
pub fn execute(service: &DataService, file: &Path, json: bool) -> Result<()> {
    let info = super::load_file(service, file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{} ({})", info.original_path, info.kind);
    if let Some(report) = &info.import {
        ui::print_import_summary(report);
    }
    if !info.kind.is_engine_backed() {
        println!("Read-only: edits are not supported for {} datasets", info.kind);
    }
    println!();

    let name_width = info
        .tables
        .iter()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("TABLE".len());
    println!("{:<name_width$}  {:>10}  COLUMNS", "TABLE", "ROWS");
    for table in &info.tables {
        println!(
            "{:<name_width$}  {:>10}  {}",
            table.name,
            table.row_count,
            table.columns.join(", ")
        );
    }
    Ok(())
}
