//! Error type for `sheetcon-store-sqlite`.

use sheetcon_core::store::CellRef;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sheet not found: {0:?}")]
  SheetNotFound(String),

  #[error("sheet already exists: {0:?}")]
  SheetExists(String),

  #[error("invalid cell reference: {0}")]
  InvalidCell(CellRef),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
