use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use comfy_table::Table;
use polars::prelude::{Column, DataFrame};

use devo_cli::pipeline::run_batch;
use devo_cli::types::{DEFAULT_DATE_COLUMN, RunOptions, RunReport, Selection};
use devo_model::{
    DatasetSchema, LEDGER_SCHEMA, LINE_ITEM_SCHEMA, TransformConfig, any_to_string,
};
use devo_output::StagingArea;
use devo_transform::TransformContext;

use crate::cli::{DailyArgs, InspectArgs, RunArgs};
use crate::summary::{apply_table_style, header_cell};

/// Default config, or the file named by `--config`.
pub fn load_config(path: Option<&Path>) -> Result<TransformConfig> {
    match path {
        Some(path) => TransformConfig::load(path)
            .with_context(|| format!("load config {}", path.display())),
        None => Ok(TransformConfig::default()),
    }
}

pub fn run_daily(args: &DailyArgs, config: &TransformConfig) -> Result<RunReport> {
    let day = args.date.unwrap_or_else(yesterday_utc);
    let options = run_options(&args.run, Selection::Day(day), &args.date_column);
    run_batch(&options, &TransformContext::new(config))
}

pub fn run_initial_load(args: &RunArgs, config: &TransformConfig) -> Result<RunReport> {
    let options = run_options(args, Selection::All, DEFAULT_DATE_COLUMN);
    run_batch(&options, &TransformContext::new(config))
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let area = StagingArea::new(&args.staging_dir);
    let batch = area
        .load()
        .with_context(|| format!("inspect {}", args.staging_dir.display()))?;
    println!("Staging: {}", area.dir().display());
    print_dataset(&LEDGER_SCHEMA, &batch.ledger);
    print_dataset(&LINE_ITEM_SCHEMA, &batch.line_items);
    Ok(())
}

pub fn run_config(config: &TransformConfig) -> Result<()> {
    let rendered = config.to_toml_string().context("render config")?;
    print!("{rendered}");
    Ok(())
}

fn run_options(args: &RunArgs, selection: Selection, date_column: &str) -> RunOptions {
    RunOptions {
        ledger: args.ledger.clone(),
        line_items: args.line_items.clone(),
        staging_dir: args
            .staging_dir
            .clone()
            .unwrap_or_else(default_staging_dir),
        selection,
        date_column: date_column.to_string(),
        keep_staging: args.keep_staging,
    }
}

fn default_staging_dir() -> PathBuf {
    std::env::temp_dir().join("devo-staging")
}

fn yesterday_utc() -> NaiveDate {
    (Utc::now() - Duration::days(1)).date_naive()
}

fn print_dataset(schema: &DatasetSchema, df: &DataFrame) {
    println!();
    println!(
        "{} -> {} (schema v{}, {} rows)",
        schema.name,
        schema.table,
        schema.version,
        df.height()
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Nulls"),
        header_cell("Field"),
        header_cell("First value"),
    ]);
    apply_table_style(&mut table);
    for column in df.get_columns() {
        let field = match schema.field(column.name().as_str()) {
            Some(field) if field.is_required() => "required",
            Some(_) => "optional",
            None => "extra",
        };
        table.add_row(vec![
            column.name().to_string(),
            column.dtype().to_string(),
            column.null_count().to_string(),
            field.to_string(),
            first_value(column),
        ]);
    }
    println!("{table}");
}

fn first_value(column: &Column) -> String {
    (0..column.len())
        .find_map(|index| column.get(index).ok().filter(|value| !value.is_null()))
        .map(any_to_string)
        .unwrap_or_default()
}
