//! UI utilities for consistent terminal output formatting.
//!
//! Provides shared formatting for error boxes, table pages and import
//! summaries.

use dbview::viewer::{Error, ImportReport, TablePage};

/// Width of error box separators.
const ERROR_BOX_WIDTH: usize = 60;

/// Widest a rendered cell may get before it is cut.
const MAX_CELL_WIDTH: usize = 40;

/// Print an error box with a title and optional detail.
///
/// Outputs:
/// ```text
/// ============================================================
/// Load Failed
/// ============================================================
///
/// <detail>
/// ```
pub fn print_error_box(title: &str, detail: Option<&str>) {
    eprintln!("\n{}", "=".repeat(ERROR_BOX_WIDTH));
    eprintln!("{title}");
    eprintln!("{}", "=".repeat(ERROR_BOX_WIDTH));

    if let Some(detail) = detail
        && !detail.is_empty()
    {
        eprintln!("\n{detail}");
    }
}

/// Print an error box followed by numbered troubleshooting hints.
pub fn print_error_box_with_hints(title: &str, detail: Option<&str>, hints: &[&str]) {
    print_error_box(title, detail);

    if !hints.is_empty() {
        eprintln!("\n{}", "=".repeat(ERROR_BOX_WIDTH));
        eprintln!("Common Issues:");
        eprintln!("{}", "=".repeat(ERROR_BOX_WIDTH));

        for (i, hint) in hints.iter().enumerate() {
            eprintln!("\n{}. {hint}", i + 1);
        }
        eprintln!();
    }
}

/// Report a failed command, with hints when the cause is a viewer error.
pub fn print_failure(error: &anyhow::Error) {
    let detail = format!("{error:#}");
    let Some(viewer_error) = error.downcast_ref::<Error>() else {
        print_error_box("Error", Some(&detail));
        return;
    };

    let (title, hints): (&str, &[&str]) = match viewer_error {
        Error::EngineUnavailable { .. } => (
            "Database Engine Unavailable",
            &[
                "dbview needs SQLite 3.36 or newer with serialize support",
                "Retry; the engine is bootstrapped again on the next run",
            ],
        ),
        Error::UnsupportedFormat { .. } => ("Unsupported File", &[]),
        Error::CorruptDatabase { .. } => (
            "Load Failed",
            &["The file is not a SQLite database; text dumps need the .sql extension"],
        ),
        Error::MalformedJson { .. } => (
            "Load Failed",
            &[r#"Expected an object of row arrays: {"table": [{"col": 1}]}"#],
        ),
        Error::NoTablesCreated { .. } => (
            "Import Failed",
            &[
                "Run with --verbose to see why each CREATE TABLE was rejected",
                "Only MySQL-style dumps are translated",
            ],
        ),
        Error::UnknownTable { .. } => ("Unknown Table", &["Run `dbview tables <FILE>` to list tables"]),
        Error::UpdateFailed { .. } => (
            "Changes Rolled Back",
            &["No change from the batch was applied"],
        ),
        _ => ("Error", &[]),
    };
    print_error_box_with_hints(title, Some(&detail), hints);
}

/// Render a page as an aligned text table.
pub fn render_page(page: &TablePage) -> String {
    let cells: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|row| row.values.iter().map(|v| clip(&v.display())).collect())
        .collect();

    let widths: Vec<usize> = page
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&render_line(page.columns.iter().map(String::as_str), &widths));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in &cells {
        out.push_str(&render_line(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

/// Print what a dump import created and skipped.
pub fn print_import_summary(report: &ImportReport) {
    println!(
        "Imported {} table(s) from {} statement(s), {} insert(s) applied",
        report.tables_created.len(),
        report.statements,
        report.inserts_applied
    );

    if report.has_warnings() {
        println!("{} statement(s) skipped:", report.warnings.len());
        for warning in &report.warnings {
            match &warning.table {
                Some(table) => println!("  - [{table}] {}", warning.message),
                None => println!("  - {}", warning.message),
            }
            println!("      {}", warning.statement);
        }
    }
}

fn render_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(value, &width)| format!("{value:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn clip(text: &str) -> String {
    let flat = text.replace(['\n', '\r', '\t'], " ");
    if flat.chars().count() <= MAX_CELL_WIDTH {
        flat
    } else {
        let cut: String = flat.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbview::viewer::{Row, Value};

    #[test]
    fn test_render_page_aligns_columns() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let page = TablePage {
            columns: columns.clone(),
            rows: vec![
                Row::new(columns.clone(), vec![Value::Integer(1), Value::Text("Ada".into())]),
                Row::new(columns, vec![Value::Integer(20), Value::Null]),
            ],
            page: 0,
            page_size: 100,
            total_rows: 2,
        };

        assert_eq!(
            render_page(&page),
            "id | name\n---+-----\n1  | Ada\n20 | NULL\n"
        );
    }

    #[test]
    fn test_clip_long_cells() {
        let long = "x".repeat(100);
        assert_eq!(clip(&long).chars().count(), MAX_CELL_WIDTH);
        assert_eq!(clip("a\nb"), "a b");
    }
}
