use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use devo_output::StagedFile;

/// Ledger header carrying the `DD/MM/YYYY` note date.
pub const DEFAULT_DATE_COLUMN: &str = "FECHA NOTA";

/// Which ledger rows a run picks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every row of the export (initial load).
    All,
    /// Rows whose date column holds this day.
    Day(NaiveDate),
}

impl Selection {
    pub fn label(&self) -> String {
        match self {
            Self::All => "initial load".to_string(),
            Self::Day(day) => format!("daily {}", day.format("%d/%m/%Y")),
        }
    }
}

/// Inputs of one batch run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub ledger: PathBuf,
    pub line_items: PathBuf,
    pub staging_dir: PathBuf,
    pub selection: Selection,
    /// Raw ledger header holding the `DD/MM/YYYY` day used by [`Selection::Day`].
    pub date_column: String,
    /// Leave the staged files in place after a successful run.
    pub keep_staging: bool,
}

/// Row counts for one dataset across the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCounts {
    pub table: &'static str,
    pub read: usize,
    pub selected: usize,
    pub typed: usize,
}

impl DatasetCounts {
    /// Rows removed by pruning.
    pub fn pruned(&self) -> usize {
        self.selected.saturating_sub(self.typed)
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub selection: Selection,
    pub captured_at: NaiveDateTime,
    pub ledger: DatasetCounts,
    pub line_items: DatasetCounts,
    pub staged: Vec<StagedFile>,
    pub staging_dir: PathBuf,
    pub staging_kept: bool,
}
