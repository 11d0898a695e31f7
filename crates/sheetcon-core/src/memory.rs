//! [`MemoryStore`] — an in-process [`SheetStore`].
//!
//! Backs dry runs and unit tests. Holds the same read/write semantics as the
//! durable backends: empty strings are blank cells, reads are trimmed, and
//! appends land below the last populated row.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::{
  header::Row,
  store::{CellRef, SheetStore, trim_trailing_empty},
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("sheet not found: {0:?}")]
  SheetNotFound(String),

  #[error("sheet already exists: {0:?}")]
  SheetExists(String),

  #[error("invalid cell reference: row {}, column {}", .0.row, .0.col)]
  InvalidCell(CellRef),
}

struct Sheet {
  title: String,
  rows:  Vec<Vec<String>>,
}

impl Sheet {
  fn last_populated_row(&self) -> usize {
    self
      .rows
      .iter()
      .rposition(|r| r.iter().any(|c| !c.is_empty()))
      .map_or(0, |i| i + 1)
  }

  fn set(&mut self, row: usize, col: usize, value: &str) {
    if self.rows.len() < row {
      self.rows.resize_with(row, Vec::new);
    }
    let cells = &mut self.rows[row - 1];
    if cells.len() < col {
      cells.resize(col, String::new());
    }
    cells[col - 1] = value.to_owned();
  }

  fn row(&self, index: usize) -> Row {
    match index.checked_sub(1).and_then(|i| self.rows.get(i)) {
      Some(cells) => trim_trailing_empty(cells.clone()),
      None => Vec::new(),
    }
  }

  fn column(&self, col: usize) -> Vec<String> {
    if col == 0 {
      return Vec::new();
    }
    let cells = self
      .rows
      .iter()
      .map(|r| r.get(col - 1).cloned().unwrap_or_default())
      .collect();
    trim_trailing_empty(cells)
  }
}

/// A spreadsheet held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
  sheets: Mutex<Vec<Sheet>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, Vec<Sheet>> {
    self.sheets.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn with_sheet<T>(
    &self,
    name: &str,
    f: impl FnOnce(&mut Sheet) -> T,
  ) -> Result<T, MemoryError> {
    let mut sheets = self.lock();
    let sheet = sheets
      .iter_mut()
      .find(|s| s.title == name)
      .ok_or_else(|| MemoryError::SheetNotFound(name.to_owned()))?;
    Ok(f(sheet))
  }

  /// Every populated row of `sheet`, trimmed, header included.
  pub fn rows(&self, sheet: &str) -> Result<Vec<Row>, MemoryError> {
    self.with_sheet(sheet, |s| {
      (1..=s.last_populated_row()).map(|i| s.row(i)).collect()
    })
  }
}

impl SheetStore for MemoryStore {
  type Error = MemoryError;

  async fn list_sheets(&self) -> Result<Vec<String>, MemoryError> {
    Ok(self.lock().iter().map(|s| s.title.clone()).collect())
  }

  async fn create_sheet(&self, name: &str) -> Result<(), MemoryError> {
    let mut sheets = self.lock();
    if sheets.iter().any(|s| s.title == name) {
      return Err(MemoryError::SheetExists(name.to_owned()));
    }
    sheets.push(Sheet { title: name.to_owned(), rows: Vec::new() });
    Ok(())
  }

  async fn read_row(&self, sheet: &str, index: u32) -> Result<Row, MemoryError> {
    self.with_sheet(sheet, |s| s.row(index as usize))
  }

  async fn read_column(
    &self,
    sheet: &str,
    col: u32,
  ) -> Result<Vec<String>, MemoryError> {
    self.with_sheet(sheet, |s| s.column(col as usize))
  }

  async fn find(
    &self,
    sheet: &str,
    value: &str,
  ) -> Result<Option<CellRef>, MemoryError> {
    self.with_sheet(sheet, |s| {
      s.rows.iter().enumerate().find_map(|(r, cells)| {
        cells
          .iter()
          .position(|c| !c.is_empty() && c == value)
          .map(|c| CellRef::new(r as u32 + 1, c as u32 + 1))
      })
    })
  }

  async fn overwrite_row(
    &self,
    sheet: &str,
    at: CellRef,
    values: &[String],
  ) -> Result<(), MemoryError> {
    if at.row == 0 || at.col == 0 {
      return Err(MemoryError::InvalidCell(at));
    }
    self.with_sheet(sheet, |s| {
      let (row, col) = (at.row as usize, at.col as usize);
      if let Some(cells) = s.rows.get_mut(row - 1) {
        cells.truncate(col - 1);
      }
      for (offset, value) in values.iter().enumerate() {
        s.set(row, col + offset, value);
      }
    })
  }

  async fn append_rows(&self, sheet: &str, rows: &[Row]) -> Result<(), MemoryError> {
    self.with_sheet(sheet, |s| {
      let start = s.last_populated_row() + 1;
      for (offset, cells) in rows.iter().enumerate() {
        for (c, value) in cells.iter().enumerate() {
          s.set(start + offset, c + 1, value);
        }
      }
    })
  }
}
