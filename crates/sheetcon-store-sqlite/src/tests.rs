//! Integration tests for `SqliteStore` against an in-memory database.

use sheetcon_core::{
  Error as CoreError,
  consolidate::{CONSOLIDATION_SHEET, ConsolidationTarget, consolidate},
  header::{Header, Row},
  pipeline::ingest,
  record::{Record, parse_batch},
  store::{CellRef, SheetStore},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn row(cells: &[&str]) -> Row { cells.iter().map(|c| c.to_string()).collect() }

/// Every row of `sheet` up to the last populated one.
async fn dump(s: &SqliteStore, sheet: &str) -> Vec<Row> {
  let mut rows = Vec::new();
  let height = s.read_column(sheet, 1).await.unwrap().len().max(
    s.read_column(sheet, 2).await.unwrap().len(),
  );
  for i in 1..=height as u32 {
    rows.push(s.read_row(sheet, i).await.unwrap());
  }
  rows
}

// ─── Sheets ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_list_sheets() {
  let s = store().await;
  s.create_sheet("2024-01-01 00.00.00").await.unwrap();
  s.create_sheet(CONSOLIDATION_SHEET).await.unwrap();

  let sheets = s.list_sheets().await.unwrap();
  assert_eq!(sheets, ["2024-01-01 00.00.00", CONSOLIDATION_SHEET]);
}

#[tokio::test]
async fn create_existing_sheet_fails() {
  let s = store().await;
  s.create_sheet("a").await.unwrap();
  let err = s.create_sheet("a").await.unwrap_err();
  assert!(matches!(err, Error::SheetExists(name) if name == "a"));
}

#[tokio::test]
async fn operations_on_missing_sheet_fail() {
  let s = store().await;
  assert!(matches!(
    s.read_row("nope", 1).await,
    Err(Error::SheetNotFound(_))
  ));
  assert!(matches!(
    s.read_column("nope", 1).await,
    Err(Error::SheetNotFound(_))
  ));
  assert!(matches!(
    s.find("nope", "x").await,
    Err(Error::SheetNotFound(_))
  ));
  assert!(matches!(
    s.overwrite_row("nope", CellRef::ORIGIN, &row(&["x"])).await,
    Err(Error::SheetNotFound(_))
  ));
  assert!(matches!(
    s.append_rows("nope", &[row(&["x"])]).await,
    Err(Error::SheetNotFound(_))
  ));
}

// ─── Cells ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_sheet_reads_empty() {
  let s = store().await;
  s.create_sheet("a").await.unwrap();
  assert!(s.read_row("a", 1).await.unwrap().is_empty());
  assert!(s.read_column("a", 1).await.unwrap().is_empty());
  assert_eq!(s.find("a", "x").await.unwrap(), None);
}

#[tokio::test]
async fn overwrite_row_replaces_from_cell() {
  let s = store().await;
  s.create_sheet("a").await.unwrap();
  s.overwrite_row("a", CellRef::ORIGIN, &row(&["a", "b", "c"]))
    .await
    .unwrap();
  s.overwrite_row("a", CellRef::new(1, 2), &row(&["z"]))
    .await
    .unwrap();
  assert_eq!(s.read_row("a", 1).await.unwrap(), ["a", "z"]);
}

#[tokio::test]
async fn overwrite_row_rejects_zero_index() {
  let s = store().await;
  s.create_sheet("a").await.unwrap();
  let err = s
    .overwrite_row("a", CellRef::new(0, 1), &row(&["x"]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidCell(_)));
}

#[tokio::test]
async fn append_rows_goes_below_last_populated_row() {
  let s = store().await;
  s.create_sheet("a").await.unwrap();
  s.overwrite_row("a", CellRef::ORIGIN, &row(&["email", "name"]))
    .await
    .unwrap();
  s.append_rows("a", &[row(&["a@x.com", "A"]), row(&["", "B"])])
    .await
    .unwrap();
  s.append_rows("a", &[row(&["c@x.com", ""])]).await.unwrap();

  assert_eq!(s.read_row("a", 3).await.unwrap(), ["", "B"]);
  assert_eq!(s.read_row("a", 4).await.unwrap(), ["c@x.com"]);
  assert_eq!(s.read_column("a", 1).await.unwrap(), [
    "email", "a@x.com", "", "c@x.com"
  ]);
  assert_eq!(s.read_column("a", 2).await.unwrap(), ["name", "A", "B"]);
}

#[tokio::test]
async fn find_returns_first_match_row_major() {
  let s = store().await;
  s.create_sheet("a").await.unwrap();
  s.append_rows("a", &[row(&["x", "email"]), row(&["email", "y"])])
    .await
    .unwrap();
  assert_eq!(s.find("a", "email").await.unwrap(), Some(CellRef::new(1, 2)));
}

#[tokio::test]
async fn sheets_are_isolated() {
  let s = store().await;
  s.create_sheet("a").await.unwrap();
  s.create_sheet("b").await.unwrap();
  s.append_rows("a", &[row(&["1"])]).await.unwrap();
  s.append_rows("b", &[row(&["2"])]).await.unwrap();
  assert_eq!(s.read_column("a", 1).await.unwrap(), ["1"]);
  assert_eq!(s.read_column("b", 1).await.unwrap(), ["2"]);
}

#[tokio::test]
async fn data_persists_across_reopen() {
  let path = std::env::temp_dir()
    .join(format!("sheetcon-store-{}.db", std::process::id()));
  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create_sheet("a").await.unwrap();
    s.append_rows("a", &[row(&["kept"])]).await.unwrap();
  }
  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.list_sheets().await.unwrap(), ["a"]);
  assert_eq!(s.read_row("a", 1).await.unwrap(), ["kept"]);
  drop(s);

  for suffix in ["", "-wal", "-shm"] {
    let mut p = path.clone().into_os_string();
    p.push(suffix);
    std::fs::remove_file(p).ok();
  }
}

// ─── Consolidation against SQLite ────────────────────────────────────────────

fn scenario() -> Vec<Record> {
  parse_batch(br#"[{"email":"a@x.com","name":"A"},{"name":"B"}]"#).unwrap()
}

#[tokio::test]
async fn end_to_end_scenario() {
  let s = store().await;
  let target = ConsolidationTarget::default();

  let report = ingest(&s, &scenario(), "2024-05-01 10.00.00", &target)
    .await
    .unwrap();
  assert_eq!(report.batch_header.fields(), ["email", "name"]);

  assert_eq!(dump(&s, "2024-05-01 10.00.00").await, vec![
    row(&["email", "name"]),
    row(&["a@x.com", "A"]),
    row(&["", "B"]),
  ]);
  assert_eq!(dump(&s, CONSOLIDATION_SHEET).await, vec![
    row(&["email", "name"]),
    row(&["a@x.com", "A"]),
    row(&["", "B"]),
  ]);
}

#[tokio::test]
async fn rerun_duplicates_only_keyless_rows() {
  let s = store().await;
  let target = ConsolidationTarget::default();

  ingest(&s, &scenario(), "run-1", &target).await.unwrap();
  let second = ingest(&s, &scenario(), "run-2", &target).await.unwrap();

  assert_eq!(second.consolidation.appended, 1);
  assert_eq!(second.consolidation.skipped, 1);
  assert_eq!(dump(&s, CONSOLIDATION_SHEET).await, vec![
    row(&["email", "name"]),
    row(&["a@x.com", "A"]),
    row(&["", "B"]),
    row(&["", "B"]),
  ]);
}

#[tokio::test]
async fn dedup_against_existing_key_column() {
  let s = store().await;
  s.create_sheet(CONSOLIDATION_SHEET).await.unwrap();
  s.overwrite_row(CONSOLIDATION_SHEET, CellRef::ORIGIN, &row(&["email"]))
    .await
    .unwrap();
  s.append_rows(CONSOLIDATION_SHEET, &[row(&["a@x.com"]), row(&["b@x.com"])])
    .await
    .unwrap();

  let records = vec![
    Record::new().with("email", "a@x.com"),
    Record::new().with("email", "c@x.com"),
  ];
  let header: Header = ["email"].into_iter().collect();
  let report = consolidate(&s, &ConsolidationTarget::default(), &records, &header)
    .await
    .unwrap();

  assert_eq!(report.appended, 1);
  assert_eq!(s.read_column(CONSOLIDATION_SHEET, 1).await.unwrap(), [
    "email", "a@x.com", "b@x.com", "c@x.com"
  ]);
}

#[tokio::test]
async fn key_column_is_resolved_after_header_growth() {
  let s = store().await;
  let target = ConsolidationTarget::default();

  // First batch has no email, so the key column does not exist yet.
  let first = vec![Record::new().with("name", "A")];
  let header: Header = ["name"].into_iter().collect();
  let err = consolidate(&s, &target, &first, &header).await.unwrap_err();
  assert!(matches!(err, CoreError::KeyNotFound { .. }));

  // A later batch brings the key; it lands in column 2.
  let second = vec![Record::new().with("email", "b@x.com").with("name", "B")];
  let header: Header = ["email", "name"].into_iter().collect();
  consolidate(&s, &target, &second, &header).await.unwrap();
  consolidate(&s, &target, &second, &header).await.unwrap();

  assert_eq!(s.read_row(CONSOLIDATION_SHEET, 1).await.unwrap(), [
    "name", "email"
  ]);
  assert_eq!(s.read_column(CONSOLIDATION_SHEET, 2).await.unwrap(), [
    "email", "b@x.com"
  ]);
}
