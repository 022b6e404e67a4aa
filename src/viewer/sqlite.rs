//! Engine-backed table store.
//!
//! Serves SQLite images and imported dumps alike: introspection, paging,
//! transactional cell edits and export of the whole image.

use super::engine::{Engine, export_image};
use super::error::{Error, Result};
use super::types::{CellChange, Row, TableDescriptor, TablePage, Value};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, warn};

/// Quotes an identifier for inlining into SQL.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Lists user tables in creation order, skipping `sqlite_%` internals.
pub(crate) fn list_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY rowid",
    )?;
    stmt.query_map([], |row| row.get::<_, String>(0))?
        .collect()
}

/// Fetches column order and row count for one table.
pub(crate) fn describe_table(conn: &Connection, name: &str) -> rusqlite::Result<TableDescriptor> {
    let quoted = quote_ident(name);

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({quoted})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let row_count: i64 =
        conn.query_row(&format!("SELECT COUNT(*) FROM {quoted}"), [], |row| row.get(0))?;

    Ok(TableDescriptor {
        name: name.to_string(),
        row_count: u64::try_from(row_count).unwrap_or(0),
        columns,
    })
}

/// A dataset whose rows live in the embedded engine.
#[derive(Debug)]
pub(crate) struct SqliteStore {
    conn: Connection,
}

/// Value a cell held before an edit batch touched it.
struct PriorValue {
    rowid: i64,
    column: String,
    value: Value,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens `bytes` as a native image and describes every user table.
    ///
    /// All-or-nothing: any introspection failure rejects the image.
    pub fn ingest(
        engine: &Engine,
        source: &str,
        bytes: &[u8],
    ) -> Result<(Self, Vec<TableDescriptor>)> {
        let conn = engine.open_image(source, bytes)?;
        let tables = list_tables(&conn)
            .and_then(|names| {
                names
                    .iter()
                    .map(|name| describe_table(&conn, name))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .map_err(|e| Error::corrupt(source, e))?;

        debug!(source, tables = tables.len(), "introspected SQLite image");
        Ok((Self::new(conn), tables))
    }

    /// Reads one page of `table` in the engine's natural scan order.
    pub fn page(&self, table: &TableDescriptor, page: usize, page_size: usize) -> Result<TablePage> {
        let name = table.name.as_str();
        let limit = i64::try_from(page_size)
            .map_err(|_| Error::query_failed(name, format!("page size {page_size} too large")))?;
        let offset = page
            .checked_mul(page_size)
            .and_then(|o| i64::try_from(o).ok())
            .ok_or_else(|| Error::query_failed(name, format!("page {page} out of range")))?;

        let sql = format!("SELECT * FROM {} LIMIT ?1 OFFSET ?2", quote_ident(name));
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| Error::query_failed(name, e))?;

        let column_count = stmt.column_count();
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        let rows = stmt
            .query_map(params![limit, offset], |row| {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(Value::from(row.get_ref(i)?));
                }
                Ok(Row::new(columns.clone(), values))
            })
            .map_err(|e| Error::query_failed(name, e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::query_failed(name, e))?;

        Ok(TablePage {
            columns,
            rows,
            page,
            page_size,
            total_rows: table.row_count,
        })
    }

    /// Applies `changes` in one transaction and exports the result.
    pub fn apply_changes(&mut self, table: &str, changes: &[CellChange]) -> Result<Vec<u8>> {
        self.apply_changes_with(table, changes, export_image)
    }

    /// Applies `changes` in order inside one transaction, then runs `export`
    /// over the committed database.
    ///
    /// Any failing update, including one that matches no row, rolls back
    /// the whole batch. If `export` fails, the committed batch is reverted
    /// cell by cell, so either the edits persist and their image is
    /// returned, or neither happens.
    pub(crate) fn apply_changes_with<F>(
        &mut self,
        table: &str,
        changes: &[CellChange],
        export: F,
    ) -> Result<Vec<u8>>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<Vec<u8>>,
    {
        let prior = self.commit_batch(table, changes)?;

        match export(&self.conn) {
            Ok(bytes) => {
                debug!(table, bytes = bytes.len(), "exported database image");
                Ok(bytes)
            }
            Err(export_err) => {
                warn!(table, error = %export_err, "export failed, reverting edit batch");
                self.revert(table, &prior).map_err(|revert_err| {
                    Error::update_failed(
                        table,
                        format!("export failed ({export_err}) and the batch could not be reverted: {revert_err}"),
                    )
                })?;
                Err(Error::update_failed(
                    table,
                    format!("exporting the updated image: {export_err}"),
                ))
            }
        }
    }

    fn commit_batch(&mut self, table: &str, changes: &[CellChange]) -> Result<Vec<PriorValue>> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| Error::update_failed(table, e))?;
        let mut prior = Vec::with_capacity(changes.len());

        for change in changes {
            let rowid = i64::try_from(change.row_index)
                .ok()
                .and_then(|i| i.checked_add(1))
                .ok_or_else(|| {
                    Error::update_failed(table, format!("row index {} out of range", change.row_index))
                })?;
            let column = quote_ident(&change.column_id);

            let previous = tx
                .query_row(
                    &format!("SELECT {column} FROM {} WHERE rowid = ?1", quote_ident(table)),
                    [rowid],
                    |row| row.get_ref(0).map(Value::from),
                )
                .optional()
                .map_err(|e| Error::update_failed(table, e))?
                .ok_or_else(|| Error::update_failed(table, format!("no row with rowid {rowid}")))?;

            tx.execute(
                &format!("UPDATE {} SET {column} = ?1 WHERE rowid = ?2", quote_ident(table)),
                params![change.value.to_rusqlite(), rowid],
            )
            .map_err(|e| Error::update_failed(table, e))?;

            prior.push(PriorValue {
                rowid,
                column,
                value: previous,
            });
        }

        tx.commit().map_err(|e| Error::update_failed(table, e))?;
        info!(table, changes = changes.len(), "committed edit batch");
        Ok(prior)
    }

    /// Restores `prior` values, newest first.
    fn revert(&mut self, table: &str, prior: &[PriorValue]) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        for cell in prior.iter().rev() {
            tx.execute(
                &format!("UPDATE {} SET {} = ?1 WHERE rowid = ?2", quote_ident(table), cell.column),
                params![cell.value.to_rusqlite(), cell.rowid],
            )?;
        }
        tx.commit()
    }
}
