//! Headers and the header reconciler.
//!
//! A header fixes the column order of a sheet. [`align`] turns a batch of
//! heterogeneous records into a rectangular table that follows a header;
//! [`Header::grow`] extends a header without disturbing existing columns.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// One sheet row of cell text, aligned 1:1 with a header.
pub type Row = Vec<String>;

/// Ordered field names defining a sheet's columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(Vec<String>);

impl Header {
  pub fn new(fields: Vec<String>) -> Self { Self(fields) }

  pub fn fields(&self) -> &[String] { &self.0 }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn contains(&self, field: &str) -> bool {
    self.0.iter().any(|f| f == field)
  }

  /// 1-based column of `field`, if present.
  pub fn column_of(&self, field: &str) -> Option<u32> {
    self
      .0
      .iter()
      .position(|f| f == field)
      .map(|i| i as u32 + 1)
  }

  /// Append every field of `other` not already present, in `other`'s order.
  ///
  /// Existing fields keep their relative order, so the result is always a
  /// superset of `self`. Returns the fields that were added.
  pub fn grow(&mut self, other: &Header) -> Vec<String> {
    let mut added = Vec::new();
    for field in &other.0 {
      if !self.contains(field) {
        self.0.push(field.clone());
        added.push(field.clone());
      }
    }
    added
  }
}

/// A batch header is its field set, in ascending byte order.
impl From<BTreeSet<String>> for Header {
  fn from(fields: BTreeSet<String>) -> Self { Self(fields.into_iter().collect()) }
}

impl<S: Into<String>> FromIterator<S> for Header {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self(iter.into_iter().map(Into::into).collect())
  }
}

/// Lay `records` out as rows following `header`.
///
/// Fields missing from a record become `""`. Fields a record has that the
/// header lacks are dropped, so callers must pass a header that covers the
/// batch's field set.
pub fn align(records: &[Record], header: &Header) -> Vec<Row> {
  records
    .iter()
    .map(|record| {
      header
        .fields()
        .iter()
        .map(|field| record.cell(field).unwrap_or_default())
        .collect()
    })
    .collect()
}
