//! [`GoogleSheets`] — the Sheets v4 REST implementation of [`SheetStore`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, de::DeserializeOwned};
use sheetcon_core::{
  header::Row,
  store::{
    CellRef, DEFAULT_COLUMNS, DEFAULT_ROWS, SheetStore, column_letters, quote_sheet,
    trim_trailing_empty,
  },
};
use tracing::debug;

use crate::{
  Error, Result,
  wire::{
    BatchUpdate, GridProperties, NewSheet, Spreadsheet, UpdateRequest, ValueRange,
    ValuesBody,
  },
};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// Connection settings for one spreadsheet.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSheetsConfig {
  pub spreadsheet_id: String,
  /// OAuth 2.0 bearer token with the spreadsheets scope.
  pub access_token:   String,
  #[serde(default = "default_base_url")]
  pub base_url:       String,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }

/// Async client for one Google spreadsheet.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GoogleSheets {
  client: Client,
  config: GoogleSheetsConfig,
}

fn row_range(sheet: &str, index: u32) -> String {
  format!("{}!{index}:{index}", quote_sheet(sheet))
}

/// From `at` to the end of its row, e.g. `'S'!B1:1`.
fn row_tail_range(sheet: &str, at: CellRef) -> String {
  format!("{}!{at}:{}", quote_sheet(sheet), at.row)
}

fn column_range(sheet: &str, col: u32) -> String {
  let letters = column_letters(col);
  format!("{}!{letters}:{letters}", quote_sheet(sheet))
}

impl GoogleSheets {
  pub fn new(config: GoogleSheetsConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  /// `{base}/v4/spreadsheets/{id}{suffix}` followed by `extra` path segments.
  fn url(&self, suffix: &str, extra: &[&str]) -> Result<Url> {
    let mut url = Url::parse(&self.config.base_url)
      .map_err(|_| Error::InvalidUrl(self.config.base_url.clone()))?;
    let spreadsheet = format!("{}{suffix}", self.config.spreadsheet_id);
    url
      .path_segments_mut()
      .map_err(|_| Error::InvalidUrl(self.config.base_url.clone()))?
      .pop_if_empty()
      .extend(["v4", "spreadsheets", spreadsheet.as_str()])
      .extend(extra);
    Ok(url)
  }

  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
    let resp = req.bearer_auth(&self.config.access_token).send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), body });
    }
    Ok(resp.json().await?)
  }

  /// `GET .../values/{range}` in the given major dimension.
  async fn get_values(&self, range: &str, major_dimension: &str) -> Result<Vec<Row>> {
    let url = self.url("", &["values", range])?;
    let vr: ValueRange = self
      .send(
        self
          .client
          .get(url)
          .query(&[("majorDimension", major_dimension)]),
      )
      .await?;
    Ok(vr.into_lines())
  }
}

impl GoogleSheets {
  /// `POST .../values/{'S'!B1:1}:clear` — blank row `at.row` from `at.col`
  /// to the end of the sheet.
  fn clear_tail_request(&self, sheet: &str, at: CellRef) -> Result<RequestBuilder> {
    let segment = format!("{}:clear", row_tail_range(sheet, at));
    let url = self.url("", &["values", segment.as_str()])?;
    Ok(self.client.post(url).json(&serde_json::json!({})))
  }

  /// `PUT .../values/{'S'!A1}` writing one row. Values go in `RAW` so header
  /// names such as `007` or `true` read back exactly as written.
  fn update_row_request(
    &self,
    sheet: &str,
    at: CellRef,
    values: &[String],
  ) -> Result<RequestBuilder> {
    let range = at.in_sheet(sheet);
    let url = self.url("", &["values", range.as_str()])?;
    let rows = [values.to_vec()];
    let body = ValuesBody {
      range:           &range,
      major_dimension: "ROWS",
      values:          &rows,
    };
    Ok(
      self
        .client
        .put(url)
        .query(&[("valueInputOption", "RAW")])
        .json(&body),
    )
  }
}

impl SheetStore for GoogleSheets {
  type Error = Error;

  async fn list_sheets(&self) -> Result<Vec<String>> {
    let url = self.url("", &[])?;
    let spreadsheet: Spreadsheet = self
      .send(
        self
          .client
          .get(url)
          .query(&[("fields", "sheets.properties.title")]),
      )
      .await?;
    Ok(
      spreadsheet
        .sheets
        .into_iter()
        .map(|s| s.properties.title)
        .collect(),
    )
  }

  async fn create_sheet(&self, name: &str) -> Result<()> {
    let url = self.url(":batchUpdate", &[])?;
    let body = BatchUpdate {
      requests: vec![UpdateRequest::AddSheet {
        properties: NewSheet {
          title:           name.to_owned(),
          grid_properties: GridProperties {
            row_count:    DEFAULT_ROWS,
            column_count: DEFAULT_COLUMNS,
          },
        },
      }],
    };
    let _: serde::de::IgnoredAny = self.send(self.client.post(url).json(&body)).await?;
    debug!(sheet = name, "created sheet");
    Ok(())
  }

  async fn read_row(&self, sheet: &str, index: u32) -> Result<Row> {
    let lines = self.get_values(&row_range(sheet, index), "ROWS").await?;
    Ok(
      lines
        .into_iter()
        .next()
        .map(trim_trailing_empty)
        .unwrap_or_default(),
    )
  }

  async fn read_column(&self, sheet: &str, col: u32) -> Result<Vec<String>> {
    let lines = self.get_values(&column_range(sheet, col), "COLUMNS").await?;
    Ok(
      lines
        .into_iter()
        .next()
        .map(trim_trailing_empty)
        .unwrap_or_default(),
    )
  }

  async fn find(&self, sheet: &str, value: &str) -> Result<Option<CellRef>> {
    let lines = self.get_values(&quote_sheet(sheet), "ROWS").await?;
    Ok(lines.iter().enumerate().find_map(|(r, cells)| {
      cells
        .iter()
        .position(|c| !c.is_empty() && c == value)
        .map(|c| CellRef::new(r as u32 + 1, c as u32 + 1))
    }))
  }

  async fn overwrite_row(
    &self,
    sheet: &str,
    at: CellRef,
    values: &[String],
  ) -> Result<()> {
    let _: serde::de::IgnoredAny = self.send(self.clear_tail_request(sheet, at)?).await?;
    let _: serde::de::IgnoredAny =
      self.send(self.update_row_request(sheet, at, values)?).await?;
    Ok(())
  }

  async fn append_rows(&self, sheet: &str, rows: &[Row]) -> Result<()> {
    let range = CellRef::ORIGIN.in_sheet(sheet);
    let segment = format!("{range}:append");
    let url = self.url("", &["values", segment.as_str()])?;
    let body = ValuesBody {
      range:           &range,
      major_dimension: "ROWS",
      values:          rows,
    };
    let _: serde::de::IgnoredAny = self
      .send(
        self
          .client
          .post(url)
          .query(&[
            ("valueInputOption", "USER_ENTERED"),
            ("insertDataOption", "INSERT_ROWS"),
          ])
          .json(&body),
      )
      .await?;
    debug!(sheet, rows = rows.len(), "appended rows");
    Ok(())
  }
}
