//! `sheetcon` — append a JSON batch to a spreadsheet and consolidate it.
//!
//! # Usage
//!
//! ```
//! sheetcon run --source https://example.com/data.json
//! sheetcon --config ~/.config/sheetcon/config.toml sheets
//! ```

mod settings;
mod source;

use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use settings::{Settings, StoreConfig, expand_tilde};
use sheetcon_core::{
  SheetStore,
  memory::MemoryStore,
  pipeline::{batch_sheet_name, ingest},
};
use sheetcon_gsheets::GoogleSheets;
use sheetcon_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "sheetcon", author, version, about = "Consolidate JSON batches into a spreadsheet")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "sheetcon.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Fetch a batch, write it to a new sheet, and consolidate it.
  Run {
    /// URL or file path of the JSON batch (overrides `source` in config).
    #[arg(long)]
    source:     Option<String>,
    /// Title for the batch sheet (default: the current local time).
    #[arg(long)]
    sheet_name: Option<String>,
    /// Run against an empty in-memory spreadsheet and print the result.
    #[arg(long)]
    dry_run:    bool,
  },
  /// List the sheets in the configured store.
  Sheets,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  if let Command::Run { dry_run: true, .. } = cli.command {
    let store = MemoryStore::new();
    return execute(&store, &settings, &cli.command)
      .await
      .and_then(|sheet| print_dry_run(&store, &settings, &sheet));
  }

  match &settings.store {
    StoreConfig::Sqlite { path } => {
      let path = expand_tilde(path);
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      execute(&store, &settings, &cli.command).await?;
    }
    StoreConfig::Google(cfg) => {
      let store = GoogleSheets::new(cfg.clone()).context("failed to build Sheets client")?;
      execute(&store, &settings, &cli.command).await?;
    }
  }
  Ok(())
}

/// Run `command` against `store`. Returns the batch sheet title for `run`.
async fn execute<S: SheetStore>(
  store: &S,
  settings: &Settings,
  command: &Command,
) -> Result<String> {
  match command {
    Command::Run { source, sheet_name, .. } => {
      let source = source
        .as_deref()
        .or(settings.source.as_deref())
        .ok_or_else(|| anyhow!("no source given; pass --source or set `source` in config"))?;
      let records = source::load_records(source).await?;

      let sheet_name = sheet_name
        .clone()
        .unwrap_or_else(|| batch_sheet_name(&Local::now()));
      let report = ingest(store, &records, &sheet_name, &settings.target())
        .await
        .context("ingestion failed")?;

      println!(
        "{}: {} rows, {} columns; {}: {} appended, {} already present",
        report.batch_sheet,
        report.batch_rows,
        report.batch_header.len(),
        settings.consolidation_sheet,
        report.consolidation.appended,
        report.consolidation.skipped,
      );
      if !report.consolidation.added_fields.is_empty() {
        println!("new columns: {}", report.consolidation.added_fields.join(", "));
      }
      Ok(report.batch_sheet)
    }
    Command::Sheets => {
      for title in store.list_sheets().await? {
        println!("{title}");
      }
      Ok(String::new())
    }
  }
}

fn print_dry_run(store: &MemoryStore, settings: &Settings, batch_sheet: &str) -> Result<()> {
  for sheet in [batch_sheet, settings.consolidation_sheet.as_str()] {
    println!("\n[{sheet}]");
    for row in store.rows(sheet)? {
      println!("{}", row.join("\t"));
    }
  }
  Ok(())
}
