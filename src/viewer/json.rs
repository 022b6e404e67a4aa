//! JSON table files.
//!
//! A JSON dataset is an object mapping table names to arrays of flat row
//! objects. It is introspected and paged in memory; nothing is handed to
//! the engine.

use super::error::{Error, Result};
use super::types::{Row, TableDescriptor, TablePage, Value};
use serde_json::Value as Json;

/// Parsed JSON tables, in document order.
#[derive(Debug, Default)]
pub(crate) struct JsonTables {
    tables: Vec<(String, Vec<Json>)>,
}

impl JsonTables {
    /// Parses `bytes` and describes each table.
    ///
    /// A key whose value is not an array becomes an empty table. Columns are
    /// the keys of the first row.
    pub fn ingest(source: &str, bytes: &[u8]) -> Result<(Self, Vec<TableDescriptor>)> {
        let malformed = |reason: String| Error::MalformedJson {
            path: source.to_string(),
            reason,
        };

        let document: Json =
            serde_json::from_slice(bytes).map_err(|e| malformed(e.to_string()))?;
        let Json::Object(map) = document else {
            return Err(malformed(
                "expected an object mapping table names to row arrays".to_string(),
            ));
        };

        let mut tables = Vec::with_capacity(map.len());
        let mut descriptors = Vec::with_capacity(map.len());
        for (name, value) in map {
            let rows = match value {
                Json::Array(rows) => rows,
                _ => Vec::new(),
            };
            let columns = match rows.first() {
                Some(Json::Object(first)) => first.keys().cloned().collect(),
                _ => Vec::new(),
            };
            descriptors.push(TableDescriptor {
                name: name.clone(),
                row_count: rows.len() as u64,
                columns,
            });
            tables.push((name, rows));
        }

        Ok((Self { tables }, descriptors))
    }

    /// Slices one page out of the parsed rows.
    ///
    /// Keys missing from a row read as NULL; keys not in the first row are
    /// not shown.
    pub fn page(&self, table: &TableDescriptor, page: usize, page_size: usize) -> Result<TablePage> {
        let rows = self
            .tables
            .iter()
            .find(|(name, _)| *name == table.name)
            .map(|(_, rows)| rows)
            .ok_or_else(|| Error::unknown_table(&table.name))?;

        let start = page.saturating_mul(page_size);
        let records = rows
            .iter()
            .skip(start)
            .take(page_size)
            .map(|record| {
                let values = table
                    .columns
                    .iter()
                    .map(|column| record.get(column).map_or(Value::Null, Value::from))
                    .collect();
                Row::new(table.columns.clone(), values)
            })
            .collect();

        Ok(TablePage {
            columns: table.columns.clone(),
            rows: records,
            page,
            page_size,
            total_rows: table.row_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOP: &str = r#"{
        "users": [
            {"id": 1, "name": "Ada", "active": true},
            {"id": 2, "name": "Linus"},
            {"id": 3, "name": "Grace", "active": false}
        ],
        "empty": [],
        "settings": {"theme": "dark"}
    }"#;

    #[test]
    fn test_ingest_descriptors() {
        let (_, tables) = JsonTables::ingest("shop.json", SHOP.as_bytes()).unwrap();
        assert_eq!(tables.len(), 3);

        assert_eq!(tables[0].name, "users");
        assert_eq!(tables[0].row_count, 3);
        assert_eq!(tables[0].columns, ["id", "name", "active"]);

        assert_eq!(tables[1].name, "empty");
        assert_eq!(tables[1].row_count, 0);
        assert!(tables[1].columns.is_empty());

        assert_eq!(tables[2].name, "settings");
        assert_eq!(tables[2].row_count, 0);
        assert!(tables[2].columns.is_empty());
    }

    #[test]
    fn test_page_fills_missing_keys_with_null() {
        let (store, tables) = JsonTables::ingest("shop.json", SHOP.as_bytes()).unwrap();
        let page = store.page(&tables[0], 0, 2).unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[1].get("name"), Some(&Value::Text("Linus".into())));
        assert_eq!(page.rows[1].get("active"), Some(&Value::Null));

        let second = store.page(&tables[0], 1, 2).unwrap();
        assert_eq!(second.rows.len(), 1);
        assert_eq!(second.rows[0].get("active"), Some(&Value::Integer(0)));
    }

    #[test]
    fn test_rejects_non_object_document() {
        let err = JsonTables::ingest("rows.json", b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, Error::MalformedJson { .. }));

        let err = JsonTables::ingest("broken.json", b"{\"a\": [").unwrap_err();
        assert!(matches!(err, Error::MalformedJson { .. }));
    }
}
