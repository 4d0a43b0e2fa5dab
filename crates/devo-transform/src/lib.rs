//! Transform stage of the devolutions pipeline.
//!
//! Turns the raw ledger and line-item exports into typed datasets:
//!
//! - **mapper**: raw headers to internal names, capture timestamp, ledger keys
//! - **pruner**: unused columns and unquantified line items
//! - **normalization**: schema-driven type coercion
//! - **pipeline**: [`transform`] runs the three stages in order
//!
//! Stages pass a [`DatasetPair`] by value. Line items stay linked to their
//! ledger row through the `devolution_id` key, never through row position.

pub mod error;
pub mod frame;
pub mod mapper;
pub mod normalization;
pub mod pipeline;
pub mod pruner;

pub use error::{FormatError, Result, TransformError};
pub use frame::DatasetPair;
pub use mapper::{map_columns, mapped_names};
pub use normalization::{normalize_frame, normalize_types};
pub use pipeline::{TransformContext, transform};
pub use pruner::{drop_unused_columns, is_unquantified, prune};
