//! Error types for schema checks and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// A dataset does not have the shape its schema requires.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required column is absent after mapping.
    #[error("{dataset}: required column '{column}' is missing")]
    MissingColumn {
        dataset: &'static str,
        column: String,
    },

    /// Two columns ended up with the same name after mapping.
    #[error("{dataset}: column '{column}' appears more than once after mapping")]
    DuplicateColumn {
        dataset: &'static str,
        column: String,
    },

    /// A column is stored with a type other than the one the schema declares.
    #[error("{dataset}: column '{column}' is stored as {actual}, expected {expected}")]
    TypeMismatch {
        dataset: &'static str,
        column: String,
        expected: String,
        actual: String,
    },
}

/// Errors raised while loading or validating a [`crate::TransformConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the config shape.
    #[error("failed to parse config {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    /// Config could not be rendered back to TOML.
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    /// Config parsed but its values are inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for schema checks.
pub type Result<T> = std::result::Result<T, SchemaError>;
