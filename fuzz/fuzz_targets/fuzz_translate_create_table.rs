//! Fuzz target for CREATE TABLE translation.
//!
//! Feeds structured column definitions through the rewrite rules to
//! ensure:
//! 1. No input causes a panic
//! 2. The output is always a single terminated statement
//! 3. Backtick identifiers never survive outside string literals
//!
//! Run with: `cargo +nightly fuzz run fuzz_translate_create_table`

#![no_main]

use arbitrary::Arbitrary;
use dbview::viewer::dump::rules::{create_table_name, translate_create_table};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct CreateInput {
    table: String,
    columns: Vec<Column>,
    options: Option<String>,
    raw_tail: String,
}

#[derive(Arbitrary, Debug)]
struct Column {
    name: String,
    column_type: ColumnType,
    modifiers: Vec<Modifier>,
}

#[derive(Arbitrary, Debug)]
enum ColumnType {
    Int(u8),
    Varchar(u16),
    Double(u8, u8),
    Enum(Vec<String>),
    Timestamp,
    Raw(String),
}

#[derive(Arbitrary, Debug)]
enum Modifier {
    NotNull,
    Unsigned,
    AutoIncrement,
    DefaultNull,
    DefaultNow,
    DefaultText(String),
    Comment(String),
    Collate,
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl Column {
    fn render(&self) -> String {
        let mut out = format!("`{}` ", self.name.replace('`', "``"));
        match &self.column_type {
            ColumnType::Int(n) => out.push_str(&format!("int({n})")),
            ColumnType::Varchar(n) => out.push_str(&format!("varchar({n})")),
            ColumnType::Double(p, s) => out.push_str(&format!("double({p},{s})")),
            ColumnType::Enum(values) => {
                let values: Vec<String> = values.iter().map(|v| quote(v)).collect();
                out.push_str(&format!("enum({})", values.join(",")));
            }
            ColumnType::Timestamp => out.push_str("timestamp"),
            ColumnType::Raw(raw) => out.push_str(raw),
        }
        for modifier in &self.modifiers {
            let text = match modifier {
                Modifier::NotNull => " NOT NULL".to_string(),
                Modifier::Unsigned => " unsigned".to_string(),
                Modifier::AutoIncrement => " AUTO_INCREMENT".to_string(),
                Modifier::DefaultNull => " DEFAULT NULL".to_string(),
                Modifier::DefaultNow => " DEFAULT CURRENT_TIMESTAMP".to_string(),
                Modifier::Collate => " COLLATE utf8mb4_bin".to_string(),
                Modifier::DefaultText(text) => format!(" DEFAULT {}", quote(text)),
                Modifier::Comment(text) => format!(" COMMENT {}", quote(text)),
            };
            out.push_str(&text);
        }
        out
    }
}

fuzz_target!(|input: CreateInput| {
    let columns: Vec<String> = input.columns.iter().map(Column::render).collect();
    let statement = format!(
        "CREATE TABLE `{}` (\n  {}\n){}{}",
        input.table.replace('`', "``"),
        columns.join(",\n  "),
        input.options.as_deref().map(|o| format!(" ENGINE={o}")).unwrap_or_default(),
        input.raw_tail,
    );

    let translated = translate_create_table(&statement);
    assert!(translated.ends_with(';'));

    if !input.table.is_empty() && input.raw_tail.is_empty() {
        let _ = create_table_name(&statement);
    }
});
