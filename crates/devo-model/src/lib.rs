//! Data model for the devolutions transform pipeline.
//!
//! - **schema**: named, versioned field lists for the ledger and line-item datasets
//! - **config**: the explicit [`TransformConfig`] (mapping tables, sentinel, defaults, locale)
//! - **error**: schema and configuration errors
//! - **polars_utils**: `AnyValue` rendering helpers

pub mod config;
pub mod error;
pub mod polars_utils;
pub mod schema;

pub use config::{
    CurrencyLocale, DEFAULT_UNUSED_SENTINEL, DEFAULT_YEAR, TransformConfig,
    default_ledger_column_map, default_line_item_column_map,
};
pub use error::{ConfigError, Result, SchemaError};
pub use polars_utils::{any_to_string, format_numeric};
pub use schema::{
    Coercion, DEVOLUTION_ID, DatasetSchema, EXTRACTED_DATE, FieldSpec, LEDGER_SCHEMA,
    LINE_ITEM_SCHEMA, Presence, StorageType, has_column, ledger, line_item,
};
