//! `dbview apply` - apply a batch of cell edits.
//!
//! Reads the change batch from a JSON file, applies it in one transaction
//! and writes the exported image. The source dataset is never modified.

use anyhow::{Context, Result};
use dbview::utils::format_bytes;
use dbview::viewer::{CellChange, DataService};
use std::fs;
use std::path::Path;

/// Execute the apply command.
pub fn execute(
    service: &DataService,
    file: &Path,
    table: &str,
    changes_file: &Path,
    out_dir: Option<&Path>,
) -> Result<()> {
    let changes = read_changes(changes_file)?;
    super::load_file(service, file)?;

    let image = service.apply_changes(table, &changes)?;

    let dir = match out_dir {
        Some(dir) => dir,
        None => file.parent().unwrap_or_else(|| Path::new(".")),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    let target = dir.join(&image.file_name);
    fs::write(&target, &image.bytes)
        .with_context(|| format!("Failed to write database: {}", target.display()))?;

    println!("Applied {} change(s) to '{table}'", changes.len());
    println!(
        "Wrote {} ({}, {})",
        target.display(),
        image.mime_type,
        format_bytes(image.bytes.len() as u64)
    );
    Ok(())
}

fn read_changes(path: &Path) -> Result<Vec<CellChange>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read changes file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse changes file: {}", path.display()))
}
