//! SQL schema for the sheetcon SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sheets (
    sheet_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL UNIQUE,
    row_count   INTEGER NOT NULL,
    col_count   INTEGER NOT NULL,
    created_at  TEXT NOT NULL      -- RFC 3339 UTC
);

-- Only non-empty cells are stored; a missing row is a blank cell.
CREATE TABLE IF NOT EXISTS cells (
    sheet_id  INTEGER NOT NULL REFERENCES sheets(sheet_id),
    row_idx   INTEGER NOT NULL,   -- 1-based
    col_idx   INTEGER NOT NULL,   -- 1-based
    value     TEXT NOT NULL,
    PRIMARY KEY (sheet_id, row_idx, col_idx),
    CHECK (row_idx > 0 AND col_idx > 0 AND value != '')
);

CREATE INDEX IF NOT EXISTS cells_value_idx ON cells(sheet_id, value);

PRAGMA user_version = 1;
";
