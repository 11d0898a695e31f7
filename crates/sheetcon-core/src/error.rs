//! Error types for `sheetcon-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The identifying key is absent from the consolidation header even after
  /// it was grown with the batch header.
  #[error("identifying key {key:?} not found in header of sheet {sheet:?}")]
  KeyNotFound { key: String, sheet: String },

  #[error("invalid batch: {0}")]
  InvalidBatch(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error. Used as `.map_err(Error::store)`.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
