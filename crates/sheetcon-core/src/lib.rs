//! Core types, the `SheetStore` trait, and the consolidation logic for
//! sheetcon.
//!
//! This crate is free of HTTP and database dependencies. Store backends
//! (`sheetcon-store-sqlite`, `sheetcon-gsheets`) implement [`SheetStore`];
//! the binary wires a backend to [`pipeline::ingest`].

// Native `async fn` in traits; the `Send` bounds are spelled out on the trait.
#![allow(async_fn_in_trait)]

pub mod consolidate;
pub mod error;
pub mod header;
pub mod memory;
pub mod pipeline;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use store::SheetStore;
