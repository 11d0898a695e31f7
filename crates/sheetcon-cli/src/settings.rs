//! Runtime configuration: an optional TOML file overlaid with `SHEETCON_*`
//! environment variables.
//!
//! ```toml
//! source              = "https://example.com/data.json"
//! key_field           = "email"
//! consolidation_sheet = "DATA CONSOLIDATION"
//!
//! [store]
//! kind = "sqlite"
//! path = "~/.local/share/sheetcon/sheets.db"
//! ```
//!
//! Nested keys use `__` in the environment, e.g.
//! `SHEETCON_STORE__ACCESS_TOKEN`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use sheetcon_core::consolidate::{CONSOLIDATION_SHEET, ConsolidationTarget, IDENTIFYING_KEY};
use sheetcon_gsheets::GoogleSheetsConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// URL or file path of the JSON batch.
  #[serde(default)]
  pub source:              Option<String>,
  #[serde(default = "default_key_field")]
  pub key_field:           String,
  #[serde(default = "default_consolidation_sheet")]
  pub consolidation_sheet: String,
  #[serde(default)]
  pub store:               StoreConfig,
}

fn default_key_field() -> String { IDENTIFYING_KEY.to_string() }

fn default_consolidation_sheet() -> String { CONSOLIDATION_SHEET.to_string() }

/// Which backend holds the spreadsheet.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
  Sqlite { path: PathBuf },
  Google(GoogleSheetsConfig),
}

impl Default for StoreConfig {
  fn default() -> Self { Self::Sqlite { path: PathBuf::from("sheetcon.db") } }
}

impl Settings {
  /// Read `path` (if it exists) and the process environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> { Self::load_with_env(path, None) }

  /// Like [`Settings::load`], reading variables from `env` instead of the
  /// process environment when given.
  fn load_with_env(
    path: &Path,
    env: Option<config::Map<String, String>>,
  ) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("SHEETCON")
          .prefix_separator("_")
          .separator("__")
          .source(env),
      )
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn target(&self) -> ConsolidationTarget {
    ConsolidationTarget {
      sheet:     self.consolidation_sheet.clone(),
      key_field: self.key_field.clone(),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
