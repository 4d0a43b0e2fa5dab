//! Error types for the transform stage.

use devo_model::SchemaError;
use thiserror::Error;

/// A value that does not parse into its target type.
///
/// Always fatal to the batch; only the blank `year` has a default.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("{column} row {row}: '{value}' is not a recognized timestamp")]
    Timestamp {
        column: String,
        row: usize,
        value: String,
    },

    #[error("{column} row {row}: '{value}' does not match DD/MM/YYYY")]
    Date {
        column: String,
        row: usize,
        value: String,
    },

    #[error("{column} row {row}: '{value}' is not an integer")]
    Integer {
        column: String,
        row: usize,
        value: String,
    },

    #[error("{column} row {row}: unrecognized flag value '{value}'")]
    Flag {
        column: String,
        row: usize,
        value: String,
    },

    #[error("{column} row {row}: no numeric token in '{value}'")]
    Quantity {
        column: String,
        row: usize,
        value: String,
    },

    #[error("{column} row {row}: '{value}' is not a decimal amount")]
    Decimal {
        column: String,
        row: usize,
        value: String,
    },
}

/// Errors that abort a transform run.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransformError {
    /// A value failed to parse.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A dataset is missing a required column or has the wrong shape.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Polars DataFrame operation error.
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;
