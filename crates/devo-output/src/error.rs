//! Error types for staging.

use std::path::PathBuf;

use devo_model::SchemaError;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OutputError {
    #[error("failed to create staging directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("staged file not found: {path}")]
    Missing { path: PathBuf },

    #[error("failed to remove {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A reloaded frame no longer matches its schema.
    #[error("staged data does not match its schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Result type for staging operations.
pub type Result<T> = std::result::Result<T, OutputError>;
