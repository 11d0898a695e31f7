//! Request and response bodies for the Sheets v4 API.
//!
//! Only the fields sheetcon reads or writes are modelled.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sheetcon_core::{header::Row, record::render_value};

// ─── Responses ───────────────────────────────────────────────────────────────

/// `GET /v4/spreadsheets/{id}?fields=sheets.properties.title`
#[derive(Debug, Deserialize)]
pub struct Spreadsheet {
  #[serde(default)]
  pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SheetEntry {
  pub properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
pub struct SheetProperties {
  pub title: String,
}

/// `GET /v4/spreadsheets/{id}/values/{range}`. `values` is omitted by the
/// API when the range is empty.
#[derive(Debug, Deserialize)]
pub struct ValueRange {
  #[serde(default)]
  pub values: Vec<Vec<Value>>,
}

impl ValueRange {
  /// All lines as cell text, in the major dimension that was requested.
  pub fn into_lines(self) -> Vec<Row> {
    self
      .values
      .into_iter()
      .map(|line| line.iter().map(render_value).collect())
      .collect()
  }
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// `POST /v4/spreadsheets/{id}:batchUpdate`
#[derive(Debug, Serialize)]
pub struct BatchUpdate {
  pub requests: Vec<UpdateRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateRequest {
  AddSheet { properties: NewSheet },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSheet {
  pub title:           String,
  pub grid_properties: GridProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
  pub row_count:    u32,
  pub column_count: u32,
}

/// Body of `values.update` and `values.append`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesBody<'a> {
  pub range:           &'a str,
  pub major_dimension: &'static str,
  pub values:          &'a [Row],
}
