//! Sheet writer and consolidation engine.
//!
//! Both operations take every input explicitly; nothing is cached between
//! calls. Each store call is its own round trip, so a run interleaved with
//! another writer on the same spreadsheet may duplicate or misplace rows.
//! Single-writer usage is assumed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
  Error, Result,
  header::{Header, align},
  record::Record,
  store::{CellRef, SheetStore},
};

/// Title of the consolidation sheet.
pub const CONSOLIDATION_SHEET: &str = "DATA CONSOLIDATION";
/// Field used to deduplicate consolidated records.
pub const IDENTIFYING_KEY: &str = "email";

/// Where consolidated rows go and which field identifies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationTarget {
  pub sheet:     String,
  pub key_field: String,
}

impl Default for ConsolidationTarget {
  fn default() -> Self {
    Self {
      sheet:     CONSOLIDATION_SHEET.to_owned(),
      key_field: IDENTIFYING_KEY.to_owned(),
    }
  }
}

/// Outcome of one [`consolidate`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationReport {
  /// Fields appended to the union header by this run.
  pub added_fields: Vec<String>,
  /// Rows appended to the consolidation sheet.
  pub appended:     usize,
  /// Records skipped because their key was already consolidated.
  pub skipped:      usize,
}

async fn ensure_sheet<S: SheetStore>(store: &S, name: &str) -> Result<()> {
  let sheets = store.list_sheets().await.map_err(Error::store)?;
  if !sheets.iter().any(|s| s == name) {
    debug!(sheet = name, "creating sheet");
    store.create_sheet(name).await.map_err(Error::store)?;
  }
  Ok(())
}

/// Write a batch to `sheet_name`, creating the sheet if needed.
///
/// The first row is replaced with `header`, then the aligned records are
/// appended below whatever the sheet already holds. Running this twice
/// appends the rows twice.
pub async fn write_batch<S: SheetStore>(
  store: &S,
  sheet_name: &str,
  records: &[Record],
  header: &Header,
) -> Result<()> {
  ensure_sheet(store, sheet_name).await?;

  store
    .overwrite_row(sheet_name, CellRef::ORIGIN, header.fields())
    .await
    .map_err(Error::store)?;

  let rows = align(records, header);
  if !rows.is_empty() {
    store
      .append_rows(sheet_name, &rows)
      .await
      .map_err(Error::store)?;
  }

  info!(sheet = sheet_name, rows = rows.len(), "wrote batch");
  Ok(())
}

/// Fold a batch into the consolidation sheet.
///
/// The sheet's header grows to cover `new_header`, then every record whose
/// key value is not already in the key column is appended. Records with an
/// absent or empty key are never considered known, so they are appended on
/// every run.
pub async fn consolidate<S: SheetStore>(
  store: &S,
  target: &ConsolidationTarget,
  new_records: &[Record],
  new_header: &Header,
) -> Result<ConsolidationReport> {
  let sheet = target.sheet.as_str();
  let key = target.key_field.as_str();

  ensure_sheet(store, sheet).await?;

  let mut union_header = Header::new(
    store.read_row(sheet, CellRef::ORIGIN.row).await.map_err(Error::store)?,
  );
  let added_fields = union_header.grow(new_header);
  store
    .overwrite_row(sheet, CellRef::ORIGIN, union_header.fields())
    .await
    .map_err(Error::store)?;
  if !added_fields.is_empty() {
    debug!(sheet, fields = ?added_fields, "grew union header");
  }

  // The key column can move between runs, so it is resolved every time.
  let key_not_found = || Error::KeyNotFound {
    key:   key.to_owned(),
    sheet: sheet.to_owned(),
  };
  let Some(key_col) = union_header.column_of(key) else {
    return Err(key_not_found());
  };
  // The stored header must agree with the one just written.
  let key_cell = store
    .find(sheet, key)
    .await
    .map_err(Error::store)?
    .filter(|cell| cell.row == CellRef::ORIGIN.row && cell.col == key_col)
    .ok_or_else(key_not_found)?;

  let known_keys: HashSet<String> = store
    .read_column(sheet, key_cell.col)
    .await
    .map_err(Error::store)?
    .into_iter()
    .skip(1)
    .filter(|v| !v.is_empty())
    .collect();

  let candidates: Vec<Record> = new_records
    .iter()
    .filter(|r| match r.cell(key) {
      Some(v) if !v.is_empty() => !known_keys.contains(&v),
      _ => true,
    })
    .cloned()
    .collect();

  let rows = align(&candidates, &union_header);
  if !rows.is_empty() {
    store.append_rows(sheet, &rows).await.map_err(Error::store)?;
  }

  let report = ConsolidationReport {
    added_fields,
    appended: rows.len(),
    skipped: new_records.len() - candidates.len(),
  };
  info!(
    sheet,
    key,
    known = known_keys.len(),
    appended = report.appended,
    skipped = report.skipped,
    "consolidated batch"
  );
  Ok(report)
}

#[cfg(test)]
mod tests {
  use crate::{header::Row, memory::MemoryStore};

  use super::*;

  fn header(fields: &[&str]) -> Header { fields.iter().copied().collect() }

  fn row(cells: &[&str]) -> Row { cells.iter().map(|c| c.to_string()).collect() }

  fn person(email: &str, name: &str) -> Record {
    Record::new().with("email", email).with("name", name)
  }

  async fn seeded(header_row: &[&str], rows: &[Row]) -> MemoryStore {
    let s = MemoryStore::new();
    s.create_sheet(CONSOLIDATION_SHEET).await.unwrap();
    s.overwrite_row(CONSOLIDATION_SHEET, CellRef::ORIGIN, &row(header_row))
      .await
      .unwrap();
    s.append_rows(CONSOLIDATION_SHEET, rows).await.unwrap();
    s
  }

  #[tokio::test]
  async fn write_batch_creates_sheet_and_writes_rows() {
    let s = MemoryStore::new();
    let records = vec![
      person("a@x.com", "A"),
      Record::new().with("name", "B"),
    ];
    write_batch(&s, "2024-01-01 00.00.00", &records, &header(&["email", "name"]))
      .await
      .unwrap();

    assert_eq!(
      s.rows("2024-01-01 00.00.00").unwrap(),
      vec![row(&["email", "name"]), row(&["a@x.com", "A"]), row(&["", "B"])]
    );
  }

  #[tokio::test]
  async fn write_batch_is_not_idempotent() {
    let s = MemoryStore::new();
    let records = vec![person("a@x.com", "A")];
    let h = header(&["email", "name"]);
    write_batch(&s, "batch", &records, &h).await.unwrap();
    write_batch(&s, "batch", &records, &h).await.unwrap();
    assert_eq!(s.rows("batch").unwrap().len(), 3);
  }

  #[tokio::test]
  async fn consolidate_skips_known_keys() {
    let s = seeded(
      &["email", "name"],
      &[row(&["a@x.com", "A"]), row(&["b@x.com", "B"])],
    )
    .await;
    let records = vec![person("a@x.com", "A again"), person("c@x.com", "C")];

    let report = consolidate(
      &s,
      &ConsolidationTarget::default(),
      &records,
      &header(&["email", "name"]),
    )
    .await
    .unwrap();

    assert_eq!(report.appended, 1);
    assert_eq!(report.skipped, 1);
    let rows = s.rows(CONSOLIDATION_SHEET).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[3], row(&["c@x.com", "C"]));
  }

  #[tokio::test]
  async fn consolidate_grows_header_and_aligns_to_union() {
    let s = seeded(&["name", "email"], &[row(&["A", "a@x.com"])]).await;
    let records = vec![
      Record::new()
        .with("age", 30)
        .with("email", "b@x.com")
        .with("name", "B"),
    ];

    let report = consolidate(
      &s,
      &ConsolidationTarget::default(),
      &records,
      &header(&["age", "email", "name"]),
    )
    .await
    .unwrap();

    assert_eq!(report.added_fields, ["age"]);
    let rows = s.rows(CONSOLIDATION_SHEET).unwrap();
    assert_eq!(rows[0], row(&["name", "email", "age"]));
    assert_eq!(rows[2], row(&["B", "b@x.com", "30"]));
  }

  #[tokio::test]
  async fn consolidate_creates_missing_sheet() {
    let s = MemoryStore::new();
    let records = vec![person("a@x.com", "A")];
    consolidate(
      &s,
      &ConsolidationTarget::default(),
      &records,
      &header(&["email", "name"]),
    )
    .await
    .unwrap();

    assert_eq!(
      s.rows(CONSOLIDATION_SHEET).unwrap(),
      vec![row(&["email", "name"]), row(&["a@x.com", "A"])]
    );
  }

  #[tokio::test]
  async fn consolidate_without_key_column_fails() {
    let s = MemoryStore::new();
    let records = vec![Record::new().with("name", "A")];
    let err = consolidate(
      &s,
      &ConsolidationTarget::default(),
      &records,
      &header(&["name"]),
    )
    .await
    .unwrap_err();

    match err {
      Error::KeyNotFound { key, sheet } => {
        assert_eq!(key, "email");
        assert_eq!(sheet, CONSOLIDATION_SHEET);
      }
      other => panic!("unexpected error: {other}"),
    }
    // The grown header is written before the key lookup fails.
    assert_eq!(s.rows(CONSOLIDATION_SHEET).unwrap(), vec![row(&["name"])]);
  }

  #[tokio::test]
  async fn key_value_in_data_does_not_stand_in_for_header() {
    // "email" appears as a data value but not as a header field.
    let s = seeded(&["name"], &[row(&["email"])]).await;
    let err = consolidate(
      &s,
      &ConsolidationTarget::default(),
      &[Record::new().with("name", "A")],
      &header(&["name"]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::KeyNotFound { .. }));
  }

  #[tokio::test]
  async fn key_column_follows_grown_header() {
    // "email" sits in the header's third column after growth.
    let s = seeded(&["name", "age"], &[row(&["A", "30"])]).await;
    let records = vec![person("b@x.com", "B")];
    let report = consolidate(
      &s,
      &ConsolidationTarget::default(),
      &records,
      &header(&["email", "name"]),
    )
    .await
    .unwrap();

    assert_eq!(report.appended, 1);
    assert_eq!(s.find(CONSOLIDATION_SHEET, "email").await.unwrap(), Some(CellRef::new(1, 3)));
    assert_eq!(s.rows(CONSOLIDATION_SHEET).unwrap()[2], row(&["B", "", "b@x.com"]));
  }

  #[tokio::test]
  async fn records_without_key_are_appended_every_run() {
    let s = MemoryStore::new();
    let records = vec![person("a@x.com", "A"), Record::new().with("name", "B")];
    let h = header(&["email", "name"]);
    let target = ConsolidationTarget::default();

    consolidate(&s, &target, &records, &h).await.unwrap();
    let second = consolidate(&s, &target, &records, &h).await.unwrap();

    assert_eq!(second.appended, 1);
    assert_eq!(second.skipped, 1);
    assert_eq!(
      s.rows(CONSOLIDATION_SHEET).unwrap(),
      vec![
        row(&["email", "name"]),
        row(&["a@x.com", "A"]),
        row(&["", "B"]),
        row(&["", "B"]),
      ]
    );
  }

  #[tokio::test]
  async fn custom_target_uses_its_sheet_and_key() {
    let s = MemoryStore::new();
    let target = ConsolidationTarget {
      sheet:     "ALL".to_owned(),
      key_field: "id".to_owned(),
    };
    let records = vec![
      Record::new().with("id", 1).with("v", "x"),
      Record::new().with("id", 1).with("v", "y"),
    ];
    let h = header(&["id", "v"]);

    // Duplicates inside a single batch are not collapsed.
    let first = consolidate(&s, &target, &records, &h).await.unwrap();
    assert_eq!(first.appended, 2);

    let second = consolidate(&s, &target, &records, &h).await.unwrap();
    assert_eq!(second.appended, 0);
    assert_eq!(second.skipped, 2);
  }
}
