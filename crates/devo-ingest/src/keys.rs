//! Surrogate keys and batch selection.
//!
//! Ledger rows are keyed once, right after extraction and before any row
//! selection, so the `devolution_id` carried by the line items stays valid no
//! matter which rows later stages keep.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use polars::prelude::{
    BooleanChunked, Column, DataFrame, DataType, NamedFrom, NewChunkedArray, Series,
};

use devo_model::{DEVOLUTION_ID, has_column};

use crate::error::{IngestError, Result};

/// Layout of ledger date cells.
pub const LEDGER_DATE_FORMAT: &str = "%d/%m/%Y";

/// Adds `devolution_id = 0..n` to a ledger that does not carry one yet.
///
/// Returns `true` if the column was added.
pub fn attach_row_keys(df: &mut DataFrame) -> Result<bool> {
    if has_column(df, DEVOLUTION_ID) {
        return Ok(false);
    }
    let height = i64::try_from(df.height()).map_err(|_| IngestError::DataFrame {
        message: "ledger too large to key".to_string(),
    })?;
    let keys: Vec<i64> = (0..height).collect();
    df.with_column(Series::new(DEVOLUTION_ID.into(), keys))?;
    Ok(true)
}

/// Reads the surrogate key column as integers, whatever its stored type.
pub fn key_values(df: &DataFrame) -> Result<Vec<Option<i64>>> {
    let column = df
        .column(DEVOLUTION_ID)
        .map_err(|_| IngestError::ColumnNotFound {
            column: DEVOLUTION_ID.to_string(),
        })?;
    let column: Column = match column.dtype() {
        DataType::String => {
            let trimmed: Vec<Option<String>> = column
                .str()?
                .into_iter()
                .map(|value| value.map(|v| v.trim().to_string()))
                .collect();
            Series::new(DEVOLUTION_ID.into(), trimmed).into()
        }
        _ => column.clone(),
    };
    let ints = column
        .strict_cast(&DataType::Int64)
        .map_err(|_| IngestError::InvalidKey {
            column: DEVOLUTION_ID.to_string(),
        })?;
    Ok(ints.i64()?.into_iter().collect())
}

/// Keeps the ledger rows whose `column` holds exactly `day` as `DD/MM/YYYY`.
pub fn select_rows_for_date(df: &DataFrame, column: &str, day: NaiveDate) -> Result<DataFrame> {
    let wanted = day.format(LEDGER_DATE_FORMAT).to_string();
    let values = df
        .column(column)
        .map_err(|_| IngestError::ColumnNotFound {
            column: column.to_string(),
        })?
        .cast(&DataType::String)?;
    let mask: Vec<bool> = values
        .str()?
        .into_iter()
        .map(|value| value.is_some_and(|v| v.trim() == wanted))
        .collect();
    let mask = BooleanChunked::from_slice("mask".into(), &mask);
    let selected = df.filter(&mask)?;
    tracing::info!(
        day = %wanted,
        column,
        selected = selected.height(),
        total = df.height(),
        "selected ledger rows for day"
    );
    Ok(selected)
}

/// Keeps the line items whose key is one of `keys`.
pub fn restrict_to_keys(line_items: &DataFrame, keys: &BTreeSet<i64>) -> Result<DataFrame> {
    let mask: Vec<bool> = key_values(line_items)?
        .into_iter()
        .map(|key| key.is_some_and(|k| keys.contains(&k)))
        .collect();
    let mask = BooleanChunked::from_slice("mask".into(), &mask);
    Ok(line_items.filter(&mask)?)
}
