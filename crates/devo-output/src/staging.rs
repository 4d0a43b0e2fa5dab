//! Parquet handoff between pipeline stages.
//!
//! A batch is staged as one file per sink table (`devolutions.parquet`,
//! `pdf_devolutions.parquet`). Parquet keeps the typed columns typed, so a
//! reload is checked against the dataset schema rather than re-parsed.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use polars::prelude::{DataFrame, ParquetReader, ParquetWriter, SerReader};

use devo_model::{DatasetSchema, LEDGER_SCHEMA, LINE_ITEM_SCHEMA};
use devo_transform::DatasetPair;

use crate::error::{OutputError, Result};

/// File extension of staged frames.
pub const STAGED_EXTENSION: &str = "parquet";

/// One staged dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Sink table the file is destined for.
    pub table: &'static str,
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: u64,
}

/// Directory holding the staged files of one run.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the staged file for a dataset.
    pub fn path_for(&self, schema: &DatasetSchema) -> PathBuf {
        self.dir
            .join(format!("{}.{STAGED_EXTENSION}", schema.table))
    }

    /// Writes both datasets, replacing any earlier files.
    pub fn stage(&self, pair: &mut DatasetPair) -> Result<Vec<StagedFile>> {
        fs::create_dir_all(&self.dir).map_err(|source| OutputError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let ledger = self.write_frame(&LEDGER_SCHEMA, &mut pair.ledger)?;
        let line_items = self.write_frame(&LINE_ITEM_SCHEMA, &mut pair.line_items)?;
        Ok(vec![ledger, line_items])
    }

    /// Reloads both datasets and checks them against their schemas.
    pub fn load(&self) -> Result<DatasetPair> {
        let ledger = self.read_frame(&LEDGER_SCHEMA)?;
        let line_items = self.read_frame(&LINE_ITEM_SCHEMA)?;
        Ok(DatasetPair::new(ledger, line_items))
    }

    /// Writes one dataset after checking it against its schema.
    pub fn write_frame(&self, schema: &DatasetSchema, df: &mut DataFrame) -> Result<StagedFile> {
        schema.check_storage(df)?;
        let path = self.path_for(schema);
        let write_error = |message: String| OutputError::Write {
            path: path.clone(),
            message,
        };

        let file = File::create(&path).map_err(|e| write_error(e.to_string()))?;
        let bytes = ParquetWriter::new(file)
            .finish(df)
            .map_err(|e| write_error(e.to_string()))?;

        tracing::debug!(
            table = schema.table,
            path = %path.display(),
            rows = df.height(),
            bytes,
            "staged dataset"
        );
        Ok(StagedFile {
            table: schema.table,
            path,
            rows: df.height(),
            bytes,
        })
    }

    /// Reads one staged dataset and checks its column types.
    pub fn read_frame(&self, schema: &DatasetSchema) -> Result<DataFrame> {
        let path = self.path_for(schema);
        let file = File::open(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                OutputError::Missing { path: path.clone() }
            } else {
                OutputError::Read {
                    path: path.clone(),
                    message: e.to_string(),
                }
            }
        })?;
        let df = ParquetReader::new(file)
            .finish()
            .map_err(|e| OutputError::Read {
                path: path.clone(),
                message: e.to_string(),
            })?;
        schema.check_storage(&df)?;
        Ok(df)
    }

    /// Removes the staged files. Files that are already gone are ignored.
    ///
    /// The directory itself is removed too when nothing else is left in it.
    pub fn cleanup(&self) -> Result<usize> {
        let mut removed = 0;
        for schema in [&LEDGER_SCHEMA, &LINE_ITEM_SCHEMA] {
            let path = self.path_for(schema);
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(OutputError::Cleanup { path, source }),
            }
        }
        // Fails harmlessly when other files remain.
        let _ = fs::remove_dir(&self.dir);
        tracing::debug!(dir = %self.dir.display(), removed, "cleaned up staging");
        Ok(removed)
    }
}
