//! The pair of datasets handed from stage to stage.

use polars::prelude::DataFrame;

/// Ledger rows and their document line items, linked by `devolution_id`.
///
/// Every stage takes the pair by value and returns a new one; the two frames
/// are never joined on row position.
#[derive(Debug, Clone)]
pub struct DatasetPair {
    /// Return-note entries from the spreadsheet.
    pub ledger: DataFrame,
    /// Product rows scraped from the return documents.
    pub line_items: DataFrame,
}

impl DatasetPair {
    pub fn new(ledger: DataFrame, line_items: DataFrame) -> Self {
        Self { ledger, line_items }
    }

    pub fn into_parts(self) -> (DataFrame, DataFrame) {
        (self.ledger, self.line_items)
    }

    pub fn ledger_rows(&self) -> usize {
        self.ledger.height()
    }

    pub fn line_item_rows(&self) -> usize {
        self.line_items.height()
    }
}
