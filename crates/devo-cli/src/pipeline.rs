//! One batch run: extract, transform, stage.

use std::collections::BTreeSet;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

use devo_ingest::{attach_row_keys, key_values, read_raw_csv, restrict_to_keys, select_rows_for_date};
use devo_model::{LEDGER_SCHEMA, LINE_ITEM_SCHEMA};
use devo_output::StagingArea;
use devo_transform::{DatasetPair, TransformContext, transform};

use crate::types::{DatasetCounts, RunOptions, RunReport, Selection};

/// Raw frames of one batch, before any transform.
#[derive(Debug)]
pub struct ExtractResult {
    pub pair: DatasetPair,
    pub ledger_read: usize,
    pub line_items_read: usize,
}

/// Reads both exports, keys the ledger and applies the selection.
pub fn extract(options: &RunOptions) -> Result<ExtractResult> {
    let mut ledger = read_raw_csv(&options.ledger)
        .with_context(|| format!("read ledger export {}", options.ledger.display()))?;
    let line_items = read_raw_csv(&options.line_items)
        .with_context(|| format!("read line-item export {}", options.line_items.display()))?;
    let ledger_read = ledger.height();
    let line_items_read = line_items.height();

    if attach_row_keys(&mut ledger)? {
        info!(rows = ledger_read, "keyed ledger rows by position");
    }

    let pair = match options.selection {
        Selection::All => DatasetPair::new(ledger, line_items),
        Selection::Day(day) => {
            let selected = select_rows_for_date(&ledger, &options.date_column, day)
                .with_context(|| format!("select ledger rows for {day}"))?;
            let keys: BTreeSet<i64> = key_values(&selected)?.into_iter().flatten().collect();
            let owned = restrict_to_keys(&line_items, &keys)
                .context("restrict line items to the selected ledger rows")?;
            DatasetPair::new(selected, owned)
        }
    };
    if pair.ledger_rows() == 0 {
        warn!(selection = %options.selection.label(), "no ledger rows selected");
    }

    Ok(ExtractResult {
        pair,
        ledger_read,
        line_items_read,
    })
}

/// Runs one batch end to end and stages the typed datasets.
///
/// The staged files are reloaded and checked before the run counts as done;
/// they are removed afterwards unless `keep_staging` is set.
pub fn run_batch(options: &RunOptions, ctx: &TransformContext<'_>) -> Result<RunReport> {
    let run_span = info_span!("run", selection = %options.selection.label());
    let _run_guard = run_span.enter();

    let extract_start = Instant::now();
    let ExtractResult {
        pair,
        ledger_read,
        line_items_read,
    } = info_span!("extract").in_scope(|| extract(options))?;
    let ledger_selected = pair.ledger_rows();
    let line_items_selected = pair.line_item_rows();
    info!(
        ledger_rows = ledger_selected,
        line_item_rows = line_items_selected,
        duration_ms = extract_start.elapsed().as_millis(),
        "extract complete"
    );

    let transform_start = Instant::now();
    let mut typed = transform(pair, ctx).context("transform batch")?;
    info!(
        duration_ms = transform_start.elapsed().as_millis(),
        "transform stage complete"
    );

    let area = StagingArea::new(&options.staging_dir);
    let staged = info_span!("stage", dir = %options.staging_dir.display())
        .in_scope(|| area.stage(&mut typed))
        .context("stage typed datasets")?;
    let reloaded = area.load().context("reload staged datasets")?;
    verify_reload(&typed.ledger, &reloaded.ledger, LEDGER_SCHEMA.table)?;
    verify_reload(&typed.line_items, &reloaded.line_items, LINE_ITEM_SCHEMA.table)?;

    if !options.keep_staging {
        area.cleanup().context("clean up staging")?;
    }

    Ok(RunReport {
        selection: options.selection,
        captured_at: ctx.captured_at(),
        ledger: DatasetCounts {
            table: LEDGER_SCHEMA.table,
            read: ledger_read,
            selected: ledger_selected,
            typed: typed.ledger_rows(),
        },
        line_items: DatasetCounts {
            table: LINE_ITEM_SCHEMA.table,
            read: line_items_read,
            selected: line_items_selected,
            typed: typed.line_item_rows(),
        },
        staged,
        staging_dir: options.staging_dir.clone(),
        staging_kept: options.keep_staging,
    })
}

fn verify_reload(written: &DataFrame, reloaded: &DataFrame, table: &str) -> Result<()> {
    if !written.equals_missing(reloaded) {
        bail!("staged {table} does not match the typed dataset after reload");
    }
    Ok(())
}
