//! Records and batches — the loosely-typed rows coming out of a data source.
//!
//! A record maps field names to JSON scalars. Fields vary from record to
//! record; there is no schema. Values are rendered to cell text only when a
//! row is built.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

// ─── Record ──────────────────────────────────────────────────────────────────

/// One object from the source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
  pub fn new() -> Self { Self::default() }

  /// Builder-style insert, handy for constructing records in code.
  pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.0.insert(field.into(), value.into());
    self
  }

  /// The cell text for `field`, or `None` when the record lacks it.
  pub fn cell(&self, field: &str) -> Option<String> {
    self.0.get(field).map(render_value)
  }

  pub fn fields(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }
}

impl<K, V> FromIterator<(K, V)> for Record
where
  K: Into<String>,
  V: Into<Value>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

/// Render a JSON value as spreadsheet cell text.
///
/// Strings are taken verbatim and `null` becomes an empty cell. Anything
/// else uses its compact JSON form.
pub fn render_value(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

// ─── Batch ───────────────────────────────────────────────────────────────────

/// Parse a JSON document holding an array of flat objects.
pub fn parse_batch(bytes: &[u8]) -> Result<Vec<Record>> {
  let doc: Value = serde_json::from_slice(bytes)?;
  let Value::Array(items) = doc else {
    return Err(Error::InvalidBatch(
      "expected a JSON array of objects".to_string(),
    ));
  };

  items
    .into_iter()
    .enumerate()
    .map(|(i, item)| match item {
      Value::Object(map) => Ok(map.into_iter().collect()),
      _ => Err(Error::InvalidBatch(format!("element {i} is not an object"))),
    })
    .collect()
}

/// The union of field names across `records`.
///
/// A `BTreeSet` iterates in ascending byte order, which is the order used
/// for a batch header.
pub fn fields_of(records: &[Record]) -> BTreeSet<String> {
  records
    .iter()
    .flat_map(|r| r.fields().map(str::to_owned))
    .collect()
}
