//! dbview command-line interface.

mod commands;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use dbview::config::Config;
use dbview::viewer::DataService;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "dbview")]
#[command(version, about = "Browse and edit SQLite databases, MySQL dumps and JSON table files")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file (default: ./dbview.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the tables of a dataset
    Tables {
        /// Dataset file (.db, .sqlite, .sqlite3, .sql, .json)
        file: PathBuf,

        /// Print dataset metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one page of a table
    Page {
        /// Dataset file
        file: PathBuf,

        /// Table name
        table: String,

        /// Zero-based page number
        #[arg(short, long, default_value = "0")]
        page: usize,

        /// Rows per page (default: viewer.page_size)
        #[arg(short = 's', long)]
        page_size: Option<usize>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply a batch of cell edits and write the updated database
    Apply {
        /// Dataset file (.db, .sqlite, .sqlite3 or .sql)
        file: PathBuf,

        /// Table to edit
        table: String,

        /// JSON array of {"rowIndex", "columnId", "value"} changes
        #[arg(long)]
        changes: PathBuf,

        /// Directory for the exported database (default: next to FILE)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    if let Err(e) = run(cli) {
        ui::print_failure(&e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "dbview", &mut std::io::stdout());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let validation = config.validate()?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }
    let service = DataService::new(config);

    match cli.command {
        Commands::Tables { file, json } => commands::tables::execute(&service, &file, json),
        Commands::Page {
            file,
            table,
            page,
            page_size,
            json,
        } => commands::page::execute(&service, &file, &table, page, page_size, json),
        Commands::Apply {
            file,
            table,
            changes,
            out_dir,
        } => commands::apply::execute(&service, &file, &table, &changes, out_dir.as_deref()),
        Commands::Completions { .. } => Ok(()),
    }
}

/// Logs go to stderr so page output on stdout stays pipeable.
fn init_logging(verbose: bool, json: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
