//! Staging of typed devolutions datasets.
//!
//! Typed frames are handed from the transform stage to the sink writer through
//! Parquet files named after their destination tables.

pub mod error;
pub mod staging;

pub use error::{OutputError, Result};
pub use staging::{STAGED_EXTENSION, StagedFile, StagingArea};
