//! SQL dump import.
//!
//! Loads a MySQL-style text dump into a fresh in-memory database in two
//! passes. Pass 1 creates tables, pass 2 populates them. A statement that
//! fails in either pass is recorded as an [`ImportWarning`] and skipped; the
//! import only fails when no table at all could be created.
//!
//! # Example
//!
//! ```ignore
//! use dbview::viewer::dump::{rules, split};
//!
//! let script = split::parse_script(dump_text);
//! for statement in &script.statements {
//!     if rules::is_create_table(statement) {
//!         println!("{}", rules::translate_create_table(statement));
//!     }
//! }
//! ```

pub mod rules;
pub mod split;

use super::engine::Engine;
use super::error::{Error, Result};
use super::sqlite::{SqliteStore, describe_table, list_tables};
use super::types::{ImportReport, ImportWarning, TableDescriptor};
use crate::constants::WARNING_STATEMENT_PREVIEW;
use crate::utils::preview;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Imports `bytes` as a SQL dump.
///
/// Tables are recorded under the names SQLite reports in `sqlite_master`
/// after each `CREATE TABLE`, not as the dump spells them.
///
/// # Errors
///
/// Returns `NoTablesCreated` when every `CREATE TABLE` failed or the dump had
/// none, and `CorruptDatabase` if the in-memory database itself misbehaves.
pub(crate) fn import(
    engine: &Engine,
    source: &str,
    bytes: &[u8],
) -> Result<(SqliteStore, Vec<TableDescriptor>, ImportReport)> {
    let text = String::from_utf8_lossy(bytes);
    let script = split::parse_script(&text);
    debug!(
        source,
        statements = script.statements.len(),
        skipped = script.skipped,
        "split SQL dump"
    );
    let mut conn = engine.create_image(source)?;

    let mut report = ImportReport {
        statements: script.statements.len() + script.skipped,
        skipped: script.skipped,
        ..ImportReport::default()
    };
    let mut created: HashSet<String> = HashSet::new();

    // Pass 1: schema.
    for statement in script.statements.iter().filter(|s| rules::is_create_table(s)) {
        let table = rules::create_table_name(statement);
        let translated = rules::translate_create_table(statement);
        debug!(table = ?table, sql = %translated, "creating table");

        if let Err(e) = conn.execute_batch(&translated) {
            warn!(table = ?table, error = %e, "failed to create table, skipping");
            report.warnings.push(warning(table, statement, &e.to_string()));
            continue;
        }

        let new_tables: Vec<String> = list_tables(&conn)
            .map_err(|e| Error::corrupt(source, e))?
            .into_iter()
            .filter(|name| !created.contains(&name.to_lowercase()))
            .collect();
        if new_tables.is_empty() {
            warn!(table = ?table, "CREATE TABLE added no table to the main schema");
            report
                .warnings
                .push(warning(table, statement, "no new table was created"));
        }
        for name in new_tables {
            created.insert(name.to_lowercase());
            report.tables_created.push(name);
        }
    }

    if report.tables_created.is_empty() {
        return Err(Error::NoTablesCreated {
            path: source.to_string(),
            failed: report.warnings.len(),
        });
    }

    // Pass 2: data, in one transaction. A failing INSERT only aborts itself.
    let tx = conn.transaction().map_err(|e| Error::corrupt(source, e))?;
    for statement in script.statements.iter().filter(|s| rules::is_insert(s)) {
        let Some(table) = rules::insert_table_name(statement) else {
            report
                .warnings
                .push(warning(None, statement, "insert target not recognised"));
            continue;
        };
        if !created.contains(&table.to_lowercase()) {
            debug!(table = %table, "skipping INSERT for table that was not created");
            continue;
        }

        match tx.execute_batch(&rules::translate_insert(statement)) {
            Ok(()) => report.inserts_applied += 1,
            Err(e) => {
                warn!(table = %table, error = %e, "failed to insert rows, skipping");
                report
                    .warnings
                    .push(warning(Some(table), statement, &e.to_string()));
            }
        }
    }
    tx.commit().map_err(|e| Error::corrupt(source, e))?;

    // A table that cannot be described is dropped from the dataset, not
    // allowed to fail the whole import.
    let mut tables = Vec::with_capacity(report.tables_created.len());
    report.tables_created.retain(|name| match describe_table(&conn, name) {
        Ok(descriptor) => {
            tables.push(descriptor);
            true
        }
        Err(e) => {
            warn!(table = %name, error = %e, "failed to introspect table, dropping it");
            report.warnings.push(ImportWarning {
                table: Some(name.clone()),
                statement: String::new(),
                message: format!("table could not be introspected: {e}"),
            });
            false
        }
    });
    if tables.is_empty() {
        return Err(Error::NoTablesCreated {
            path: source.to_string(),
            failed: report.warnings.len(),
        });
    }

    info!(
        source,
        tables = tables.len(),
        inserts = report.inserts_applied,
        warnings = report.warnings.len(),
        "imported SQL dump"
    );

    Ok((SqliteStore::new(conn), tables, report))
}

fn warning(table: Option<String>, statement: &str, message: &str) -> ImportWarning {
    ImportWarning {
        table,
        statement: preview(statement, WARNING_STATEMENT_PREVIEW),
        message: message.to_string(),
    }
}
