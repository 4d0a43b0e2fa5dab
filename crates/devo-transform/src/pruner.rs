//! Column and row pruning.
//!
//! Drops every column the mapper marked unused and every line item whose
//! quantity is missing, blank or zero.

use polars::prelude::*;

use devo_model::{SchemaError, TransformConfig, has_column, line_item};

use crate::error::Result;
use crate::frame::DatasetPair;
use crate::normalization::parse_leading_decimal;

/// Prunes unused columns from both datasets and unquantified line items.
///
/// Ledger rows are never dropped.
pub fn prune(pair: DatasetPair, config: &TransformConfig) -> Result<DatasetPair> {
    let (mut ledger, mut line_items) = pair.into_parts();
    drop_unused_columns(&mut ledger, config)?;
    drop_unused_columns(&mut line_items, config)?;

    if !has_column(&line_items, line_item::QUANTITY) {
        return Err(SchemaError::MissingColumn {
            dataset: "line_items",
            column: line_item::QUANTITY.to_string(),
        }
        .into());
    }
    let before = line_items.height();
    let line_items = retain_quantified(&line_items, config)?;
    tracing::debug!(
        kept = line_items.height(),
        dropped = before - line_items.height(),
        "pruned line items without quantity"
    );

    Ok(DatasetPair::new(ledger, line_items))
}

/// Removes columns named by the unused sentinel. Returns how many were dropped.
pub fn drop_unused_columns(df: &mut DataFrame, config: &TransformConfig) -> Result<usize> {
    let unused: Vec<String> = df
        .get_column_names()
        .iter()
        .filter(|name| config.is_unused_column(name.as_str()))
        .map(|name| name.to_string())
        .collect();
    for name in &unused {
        df.drop_in_place(name)?;
    }
    Ok(unused.len())
}

/// True when a raw quantity cell holds no usable quantity.
///
/// Blank cells and cells whose first numeric token is zero are unquantified.
/// Cells without any digits are kept so the normalizer can reject them.
pub fn is_unquantified(value: Option<&str>, decimal_separator: char) -> bool {
    match value {
        None => true,
        Some(raw) if raw.trim().is_empty() => true,
        Some(raw) => parse_leading_decimal(raw, decimal_separator) == Some(0.0),
    }
}

fn retain_quantified(df: &DataFrame, config: &TransformConfig) -> Result<DataFrame> {
    let column = df.column(line_item::QUANTITY)?;
    let mask: Vec<bool> = if column.dtype().is_primitive_numeric() {
        column
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|value| value.is_some_and(|v| v.is_finite() && v != 0.0))
            .collect()
    } else {
        let separator = config.currency_locale.decimal_separator;
        column
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|value| !is_unquantified(value, separator))
            .collect()
    };
    let mask = BooleanChunked::from_slice("mask".into(), &mask);
    Ok(df.filter(&mask)?)
}
