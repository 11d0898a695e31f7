//! Error type for `sheetcon-gsheets`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("sheets api returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("invalid base url {0:?}")]
  InvalidUrl(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
