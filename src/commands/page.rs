//! `dbview page` - print one page of a table.

use anyhow::Result;
use dbview::viewer::DataService;
use std::path::Path;

use crate::ui;

/// Execute the page command.
pub fn execute(
    service: &DataService,
    file: &Path,
    table: &str,
    page: usize,
    page_size: Option<usize>,
    json: bool,
) -> Result<()> {
    super::load_file(service, file)?;
    let result = service.get_table_page(table, page, page_size)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print!("{}", ui::render_page(&result));

    let first = result.page.saturating_mul(result.page_size);
    let shown = result.rows.len();
    if shown == 0 {
        println!("(no rows on page {}; {} total)", result.page, result.total_rows);
    } else {
        println!(
            "rows {}-{} of {} (page {})",
            first + 1,
            first + shown,
            result.total_rows,
            result.page
        );
    }
    Ok(())
}
