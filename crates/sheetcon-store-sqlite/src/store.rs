//! [`SqliteStore`] — the SQLite implementation of [`SheetStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use sheetcon_core::{
  header::Row,
  store::{CellRef, DEFAULT_COLUMNS, DEFAULT_ROWS, SheetStore},
};
use tracing::debug;

use crate::{
  Error, Result,
  encode::{densify, encode_dt},
  schema::SCHEMA,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn sheet_id(conn: &rusqlite::Connection, title: &str) -> rusqlite::Result<Option<i64>> {
  conn
    .query_row(
      "SELECT sheet_id FROM sheets WHERE title = ?1",
      rusqlite::params![title],
      |r| r.get(0),
    )
    .optional()
}

/// Insert the non-empty `values` of one row starting at `first_col`.
fn insert_row(
  stmt: &mut rusqlite::Statement<'_>,
  id: i64,
  row: u32,
  first_col: u32,
  values: &[String],
) -> rusqlite::Result<()> {
  for (offset, value) in values.iter().enumerate() {
    if value.is_empty() {
      continue;
    }
    stmt.execute(rusqlite::params![id, row, first_col + offset as u32, value])?;
  }
  Ok(())
}

const INSERT_CELL: &str =
  "INSERT OR REPLACE INTO cells (sheet_id, row_idx, col_idx, value)
   VALUES (?1, ?2, ?3, ?4)";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A spreadsheet backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read `(index, value)` pairs for one row or column of `sheet`.
  ///
  /// `None` means the sheet does not exist.
  async fn read_line(
    &self,
    sheet: &str,
    sql: &'static str,
    index: u32,
  ) -> Result<Vec<String>> {
    let title = sheet.to_owned();
    let cells: Option<Vec<(u32, String)>> = self
      .conn
      .call(move |conn| {
        let Some(id) = sheet_id(conn, &title)? else {
          return Ok(None);
        };
        let mut stmt = conn.prepare(sql)?;
        let cells = stmt
          .query_map(rusqlite::params![id, index], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(cells))
      })
      .await?;

    cells
      .map(densify)
      .ok_or_else(|| Error::SheetNotFound(sheet.to_owned()))
  }
}

// ─── SheetStore impl ─────────────────────────────────────────────────────────

impl SheetStore for SqliteStore {
  type Error = Error;

  async fn list_sheets(&self) -> Result<Vec<String>> {
    let titles = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT title FROM sheets ORDER BY sheet_id")?;
        let titles = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(titles)
      })
      .await?;
    Ok(titles)
  }

  async fn create_sheet(&self, name: &str) -> Result<()> {
    let title = name.to_owned();
    let at_str = encode_dt(Utc::now());

    let created = self
      .conn
      .call(move |conn| {
        if sheet_id(conn, &title)?.is_some() {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO sheets (title, row_count, col_count, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![title, DEFAULT_ROWS, DEFAULT_COLUMNS, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !created {
      return Err(Error::SheetExists(name.to_owned()));
    }
    debug!(sheet = name, "created sheet");
    Ok(())
  }

  async fn read_row(&self, sheet: &str, index: u32) -> Result<Row> {
    self
      .read_line(
        sheet,
        "SELECT col_idx, value FROM cells
         WHERE sheet_id = ?1 AND row_idx = ?2 ORDER BY col_idx",
        index,
      )
      .await
  }

  async fn read_column(&self, sheet: &str, col: u32) -> Result<Vec<String>> {
    self
      .read_line(
        sheet,
        "SELECT row_idx, value FROM cells
         WHERE sheet_id = ?1 AND col_idx = ?2 ORDER BY row_idx",
        col,
      )
      .await
  }

  async fn find(&self, sheet: &str, value: &str) -> Result<Option<CellRef>> {
    let title = sheet.to_owned();
    let needle = value.to_owned();

    // Outer `None`: no such sheet. Inner `None`: no matching cell.
    let found: Option<Option<(u32, u32)>> = self
      .conn
      .call(move |conn| {
        let Some(id) = sheet_id(conn, &title)? else {
          return Ok(None);
        };
        let cell = conn
          .query_row(
            "SELECT row_idx, col_idx FROM cells
             WHERE sheet_id = ?1 AND value = ?2
             ORDER BY row_idx, col_idx LIMIT 1",
            rusqlite::params![id, needle],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;
        Ok(Some(cell))
      })
      .await?;

    let cell = found.ok_or_else(|| Error::SheetNotFound(sheet.to_owned()))?;
    Ok(cell.map(|(row, col)| CellRef::new(row, col)))
  }

  async fn overwrite_row(
    &self,
    sheet: &str,
    at: CellRef,
    values: &[String],
  ) -> Result<()> {
    if at.row == 0 || at.col == 0 {
      return Err(Error::InvalidCell(at));
    }
    let title = sheet.to_owned();
    let values = values.to_vec();

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(id) = sheet_id(&tx, &title)? else {
          return Ok(false);
        };
        tx.execute(
          "DELETE FROM cells WHERE sheet_id = ?1 AND row_idx = ?2 AND col_idx >= ?3",
          rusqlite::params![id, at.row, at.col],
        )?;
        {
          let mut stmt = tx.prepare(INSERT_CELL)?;
          insert_row(&mut stmt, id, at.row, at.col, &values)?;
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::SheetNotFound(sheet.to_owned()));
    }
    Ok(())
  }

  async fn append_rows(&self, sheet: &str, rows: &[Row]) -> Result<()> {
    let title = sheet.to_owned();
    let rows = rows.to_vec();
    let count = rows.len();

    let start = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(id) = sheet_id(&tx, &title)? else {
          return Ok(None);
        };
        let last: u32 = tx.query_row(
          "SELECT COALESCE(MAX(row_idx), 0) FROM cells WHERE sheet_id = ?1",
          rusqlite::params![id],
          |r| r.get(0),
        )?;
        {
          let mut stmt = tx.prepare(INSERT_CELL)?;
          for (offset, values) in rows.iter().enumerate() {
            insert_row(&mut stmt, id, last + 1 + offset as u32, 1, values)?;
          }
        }
        tx.commit()?;
        Ok(Some(last + 1))
      })
      .await?;

    let start = start.ok_or_else(|| Error::SheetNotFound(sheet.to_owned()))?;
    debug!(sheet, start, rows = count, "appended rows");
    Ok(())
  }
}
