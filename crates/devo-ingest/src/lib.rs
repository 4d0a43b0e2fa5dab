//! Raw dataset ingestion for the devolutions pipeline.
//!
//! This crate is the local stand-in for the extraction collaborator: it turns
//! CSV exports of the spreadsheet and of the scraped document tables into raw,
//! all-string Polars DataFrames ready for the transform stage.
//!
//! # Features
//!
//! - **CSV Loading**: all-string reads, empty cells kept as `""`, header cleanup
//! - **Surrogate Keys**: stable `devolution_id` on the ledger before any selection
//! - **Daily Selection**: keep one day's ledger rows and the line items they own
//!
//! # Example
//!
//! ```ignore
//! use devo_ingest::{attach_row_keys, read_raw_csv};
//!
//! let mut ledger = read_raw_csv(Path::new("exports/ledger.csv"))?;
//! attach_row_keys(&mut ledger)?;
//! let line_items = read_raw_csv(Path::new("exports/line_items.csv"))?;
//! ```

mod csv;
mod error;
mod keys;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv::{normalize_header, read_raw_csv, validate_encoding};

// === Keys and Selection ===
pub use keys::{
    LEDGER_DATE_FORMAT, attach_row_keys, key_values, restrict_to_keys, select_rows_for_date,
};
