//! Google Sheets backend for sheetcon.
//!
//! Talks to the Sheets v4 REST API with a caller-supplied OAuth access token.
//! Obtaining and refreshing that token is the caller's responsibility.
//!
//! Header rows are written `RAW`. Data rows are appended `USER_ENTERED`, so
//! Sheets may reformat them (`007` reads back as `7`); a key field holding
//! such values will not match on later runs.

mod client;
mod wire;

pub mod error;

pub use client::{DEFAULT_BASE_URL, GoogleSheets, GoogleSheetsConfig};
pub use error::{Error, Result};
