//! The `SheetStore` trait and cell addressing.
//!
//! The trait is implemented by storage backends (`sheetcon-store-sqlite`,
//! `sheetcon-gsheets`, and the in-process [`MemoryStore`]). The consolidation
//! logic depends only on this abstraction.
//!
//! [`MemoryStore`]: crate::memory::MemoryStore

use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};

use crate::header::Row;

/// Row count given to newly created sheets.
pub const DEFAULT_ROWS: u32 = 1000;
/// Column count given to newly created sheets.
pub const DEFAULT_COLUMNS: u32 = 20;

// ─── Addressing ──────────────────────────────────────────────────────────────

/// A 1-based cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
  pub row: u32,
  pub col: u32,
}

impl CellRef {
  pub const ORIGIN: CellRef = CellRef { row: 1, col: 1 };

  pub fn new(row: u32, col: u32) -> Self { Self { row, col } }

  /// The A1 reference qualified with a sheet title, e.g. `'Sheet 1'!B3`.
  pub fn in_sheet(&self, sheet: &str) -> String {
    format!("{}!{self}", quote_sheet(sheet))
  }
}

/// A1 notation, e.g. `AA12`.
impl fmt::Display for CellRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}", column_letters(self.col), self.row)
  }
}

/// Spreadsheet column letters for a 1-based column index (`1 -> A`,
/// `27 -> AA`). Column 0 has no letters and renders empty.
pub fn column_letters(col: u32) -> String {
  let mut n = col;
  let mut letters = Vec::new();
  while n > 0 {
    let rem = (n - 1) % 26;
    letters.push(b'A' + rem as u8);
    n = (n - 1) / 26;
  }
  letters.reverse();
  String::from_utf8(letters).unwrap_or_default()
}

/// Quote a sheet title for use in a range. Embedded quotes are doubled.
pub fn quote_sheet(sheet: &str) -> String {
  format!("'{}'", sheet.replace('\'', "''"))
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a spreadsheet made of named sheets.
///
/// Reads trim trailing empty cells and render interior gaps as `""`.
/// Writing `""` leaves a cell blank. Every call is an independent round trip;
/// nothing here is transactional across calls.
pub trait SheetStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All sheet titles, in spreadsheet order.
  fn list_sheets(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Create an empty sheet of [`DEFAULT_ROWS`] by [`DEFAULT_COLUMNS`].
  /// Returns an error if the title is taken.
  fn create_sheet<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Values of the row at 1-based `index`.
  fn read_row<'a>(
    &'a self,
    sheet: &'a str,
    index: u32,
  ) -> impl Future<Output = Result<Row, Self::Error>> + Send + 'a;

  /// Values of the column at 1-based `col`, top to bottom.
  fn read_column<'a>(
    &'a self,
    sheet: &'a str,
    col: u32,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;

  /// First cell, scanning row by row, whose text equals `value`.
  fn find<'a>(
    &'a self,
    sheet: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<Option<CellRef>, Self::Error>> + Send + 'a;

  /// Replace row `at.row` from column `at.col` onward with `values`.
  fn overwrite_row<'a>(
    &'a self,
    sheet: &'a str,
    at: CellRef,
    values: &'a [String],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Append `rows` below the last row holding any non-empty cell.
  fn append_rows<'a>(
    &'a self,
    sheet: &'a str,
    rows: &'a [Row],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Trim trailing empty cells, the shape every read returns.
pub fn trim_trailing_empty(mut cells: Vec<String>) -> Vec<String> {
  while cells.last().is_some_and(String::is_empty) {
    cells.pop();
  }
  cells
}
