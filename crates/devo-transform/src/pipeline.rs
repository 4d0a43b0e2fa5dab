//! Transform orchestration: map, prune, normalize.

use chrono::{Local, NaiveDateTime, SubsecRound};
use tracing::info_span;

use devo_model::TransformConfig;

use crate::error::Result;
use crate::frame::DatasetPair;
use crate::mapper::map_columns;
use crate::normalization::normalize_types;
use crate::pruner::prune;

/// Inputs shared by every stage of one run.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    config: &'a TransformConfig,
    captured_at: NaiveDateTime,
}

impl<'a> TransformContext<'a> {
    /// Context stamped with the current local time.
    pub fn new(config: &'a TransformConfig) -> Self {
        Self::with_capture_time(config, Local::now().naive_local())
    }

    /// Context with a fixed capture time, truncated to milliseconds.
    pub fn with_capture_time(config: &'a TransformConfig, captured_at: NaiveDateTime) -> Self {
        Self {
            config,
            captured_at: captured_at.trunc_subsecs(3),
        }
    }

    pub fn config(&self) -> &'a TransformConfig {
        self.config
    }

    /// Value written to `extracted_date` on both datasets.
    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }
}

/// Runs the transform stage over one batch.
///
/// Either both datasets come back typed or the whole batch fails.
pub fn transform(pair: DatasetPair, ctx: &TransformContext<'_>) -> Result<DatasetPair> {
    let span = info_span!(
        "transform",
        ledger_rows = pair.ledger_rows(),
        line_item_rows = pair.line_item_rows()
    );
    let _guard = span.enter();

    let mapped = info_span!("map_columns").in_scope(|| map_columns(pair, ctx))?;
    let pruned = info_span!("prune").in_scope(|| prune(mapped, ctx.config()))?;
    let typed = info_span!("normalize_types").in_scope(|| normalize_types(pruned, ctx.config()))?;

    tracing::info!(
        ledger_rows = typed.ledger_rows(),
        line_item_rows = typed.line_item_rows(),
        "transform complete"
    );
    Ok(typed)
}
