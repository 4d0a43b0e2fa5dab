//! Column mapping.
//!
//! Renames raw headers to internal names, spreads the unused sentinel over
//! numbered names so discarded columns never collide, stamps the capture time
//! and keys ledger rows that arrive without a `devolution_id`.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;

use devo_model::{
    DEVOLUTION_ID, EXTRACTED_DATE, SchemaError, TransformConfig, has_column,
};

use crate::error::Result;
use crate::frame::DatasetPair;
use crate::normalization::datetime_to_millis;
use crate::pipeline::TransformContext;

/// Maps both datasets to internal column names.
///
/// Only names change, plus the added `extracted_date` column (and the ledger
/// key when it is missing). No value is modified and no row is removed.
pub fn map_columns(pair: DatasetPair, ctx: &TransformContext<'_>) -> Result<DatasetPair> {
    let config = ctx.config();
    let (ledger, line_items) = pair.into_parts();

    let mut ledger = rename_columns(ledger, "ledger", &config.ledger_column_map, config)?;
    if !has_column(&ledger, DEVOLUTION_ID) {
        attach_positional_keys(&mut ledger)?;
    }
    stamp_capture_time(&mut ledger, ctx)?;

    let mut line_items =
        rename_columns(line_items, "line_items", &config.line_item_column_map, config)?;
    stamp_capture_time(&mut line_items, ctx)?;

    Ok(DatasetPair::new(ledger, line_items))
}

/// Computes the mapped name of every column, in frame order.
///
/// Headers mapped to the sentinel, and columns already carrying a sentinel
/// name, become `<sentinel>`, `<sentinel>_2`, `<sentinel>_3`, ...
pub fn mapped_names(
    columns: &[String],
    map: &BTreeMap<String, String>,
    config: &TransformConfig,
) -> Vec<String> {
    let sentinel = config.unused_sentinel_name.as_str();
    let mut unused = 0usize;
    columns
        .iter()
        .map(|name| {
            let target = map.get(name).map(String::as_str).unwrap_or(name.as_str());
            if config.is_sentinel_target(target) || config.is_unused_column(target) {
                unused += 1;
                if unused == 1 {
                    sentinel.to_string()
                } else {
                    format!("{sentinel}_{unused}")
                }
            } else {
                target.to_string()
            }
        })
        .collect()
}

fn rename_columns(
    mut df: DataFrame,
    dataset: &'static str,
    map: &BTreeMap<String, String>,
    config: &TransformConfig,
) -> Result<DataFrame> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let targets = mapped_names(&columns, map, config);

    let mut seen = BTreeSet::new();
    for target in &targets {
        if !seen.insert(target.as_str()) {
            return Err(SchemaError::DuplicateColumn {
                dataset,
                column: target.clone(),
            }
            .into());
        }
    }

    let renamed = columns
        .iter()
        .zip(&targets)
        .filter(|(source, target)| source != target)
        .count();
    if renamed > 0 {
        df.set_column_names(targets.iter().map(String::as_str))?;
    }
    tracing::debug!(dataset, renamed, columns = df.width(), "mapped columns");
    Ok(df)
}

fn attach_positional_keys(df: &mut DataFrame) -> Result<()> {
    let height = i64::try_from(df.height())
        .map_err(|_| PolarsError::ComputeError("ledger too large to key".into()))?;
    let keys: Vec<i64> = (0..height).collect();
    df.with_column(Series::new(DEVOLUTION_ID.into(), keys))?;
    Ok(())
}

fn stamp_capture_time(df: &mut DataFrame, ctx: &TransformContext<'_>) -> Result<()> {
    let millis = datetime_to_millis(ctx.captured_at());
    let stamp = Series::new(EXTRACTED_DATE.into(), vec![millis; df.height()])
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    df.with_column(stamp)?;
    Ok(())
}
