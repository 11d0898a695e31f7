//! Conversions between sparse `(index, value)` cell lists read from SQLite
//! and the dense, trimmed vectors the [`SheetStore`] trait returns.
//!
//! [`SheetStore`]: sheetcon_core::SheetStore

use chrono::{DateTime, Utc};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

/// Densify cells sorted by index into a vector with `""` in the gaps.
///
/// Only non-empty cells are stored, so the last element is never blank and
/// no trailing trim is needed.
pub fn densify(cells: Vec<(u32, String)>) -> Vec<String> {
  let mut out = Vec::new();
  for (idx, value) in cells {
    if idx == 0 {
      continue;
    }
    let slot = idx as usize - 1;
    if out.len() <= slot {
      out.resize(slot + 1, String::new());
    }
    out[slot] = value;
  }
  out
}
