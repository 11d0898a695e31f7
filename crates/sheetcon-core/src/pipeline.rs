//! One ingestion run: batch sheet, then consolidation.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  Result,
  consolidate::{ConsolidationReport, ConsolidationTarget, consolidate, write_batch},
  header::Header,
  record::{Record, fields_of},
  store::SheetStore,
};

/// `strftime` pattern for per-run sheet titles.
pub const SHEET_NAME_FORMAT: &str = "%Y-%m-%d %H.%M.%S";

/// Title for the sheet holding a batch ingested at `at`.
pub fn batch_sheet_name<Tz>(at: &DateTime<Tz>) -> String
where
  Tz: TimeZone,
  Tz::Offset: std::fmt::Display,
{
  at.format(SHEET_NAME_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
  pub batch_sheet:   String,
  pub batch_header:  Header,
  pub batch_rows:    usize,
  pub consolidation: ConsolidationReport,
}

/// Write `records` to a fresh `sheet_name` and consolidate them.
///
/// The batch header is the batch's field set in ascending byte order. A
/// failure part way leaves earlier writes in place.
pub async fn ingest<S: SheetStore>(
  store: &S,
  records: &[Record],
  sheet_name: &str,
  target: &ConsolidationTarget,
) -> Result<IngestReport> {
  let batch_header = Header::from(fields_of(records));
  info!(
    sheet = sheet_name,
    records = records.len(),
    fields = batch_header.len(),
    "ingesting batch"
  );

  write_batch(store, sheet_name, records, &batch_header).await?;
  let consolidation = consolidate(store, target, records, &batch_header).await?;

  Ok(IngestReport {
    batch_sheet: sheet_name.to_owned(),
    batch_header,
    batch_rows: records.len(),
    consolidation,
  })
}
