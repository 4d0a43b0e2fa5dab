//! Integration tests for batch runs.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use devo_cli::pipeline::{extract, run_batch};
use devo_cli::types::{DEFAULT_DATE_COLUMN, RunOptions, Selection};
use devo_model::TransformConfig;
use devo_output::StagingArea;
use devo_transform::TransformContext;
use tempfile::TempDir;

const LEDGER: &str = "Marca temporal,FAMILIA PRODUCTOS,FECHA NOTA,NOTA,MONTO,RECONOCIMIENTO,USUARIO,PDF NOTA,FORM PC,MES,ANO,FECHA\n\
2024-06-25 09:00:00,ANALGESICOS,25/06/2024,101406,1000,SI,ops@example.com,https://docs.example.com/1,SI,6,2024,\n\
2024-06-26 13:53:43,VITAMINAS,26/06/2024,101407,37120,NO,ops@example.com,https://docs.example.com/2,,6,,\n\
2024-06-26 14:10:00,VITAMINAS,26/06/2024,101408,643224,TEST,ops@example.com,https://docs.example.com/3,NO,6,2024,\n";

const LINE_ITEMS: &str = "Código,Descripción,Cantidad,PVP,devolution_id\n\
600,Product Z,2,\"1.000,00\",0\n\
608,\"Product A\nwith newline\",\"1,5\",\"1.234,56\",1\n\
609,Product B,0,\"10,00\",1\n\
610,Product C,3 unid,,2\n";

fn write_exports(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let ledger = dir.join("ledger.csv");
    let line_items = dir.join("line_items.csv");
    fs::write(&ledger, LEDGER).unwrap();
    fs::write(&line_items, LINE_ITEMS).unwrap();
    (ledger, line_items)
}

fn options(dir: &TempDir, selection: Selection, keep_staging: bool) -> RunOptions {
    let (ledger, line_items) = write_exports(dir.path());
    RunOptions {
        ledger,
        line_items,
        staging_dir: dir.path().join("staging"),
        selection,
        date_column: DEFAULT_DATE_COLUMN.to_string(),
        keep_staging,
    }
}

fn captured() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 27)
        .unwrap()
        .and_hms_opt(3, 0, 0)
        .unwrap()
}

#[test]
fn daily_run_selects_one_day_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 6, 26).unwrap();
    let options = options(&dir, Selection::Day(day), false);
    let config = TransformConfig::default();
    let ctx = TransformContext::with_capture_time(&config, captured());

    let report = run_batch(&options, &ctx).unwrap();

    assert_eq!(report.ledger.read, 3);
    assert_eq!(report.ledger.selected, 2);
    assert_eq!(report.ledger.typed, 2);
    assert_eq!(report.line_items.read, 4);
    assert_eq!(report.line_items.selected, 3);
    assert_eq!(report.line_items.typed, 2);
    assert_eq!(report.line_items.pruned(), 1);
    assert_eq!(report.staged.len(), 2);
    assert!(!options.staging_dir.exists());
}

#[test]
fn initial_load_keeps_staging_on_request() {
    let dir = TempDir::new().unwrap();
    let options = options(&dir, Selection::All, true);
    let config = TransformConfig::default();
    let ctx = TransformContext::with_capture_time(&config, captured());

    let report = run_batch(&options, &ctx).unwrap();
    assert_eq!(report.ledger.typed, 3);
    assert_eq!(report.line_items.typed, 3);

    let staged = StagingArea::new(&options.staging_dir).load().unwrap();
    let keys: Vec<Option<i64>> = staged
        .ledger
        .column("devolution_id")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(keys, vec![Some(0), Some(1), Some(2)]);
    let years: Vec<Option<i64>> = staged
        .ledger
        .column("year")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(years, vec![Some(2024), Some(2024), Some(2024)]);
}

#[test]
fn daily_selection_keeps_positional_keys() {
    let dir = TempDir::new().unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 6, 26).unwrap();
    let options = options(&dir, Selection::Day(day), false);

    let extracted = extract(&options).unwrap();
    let keys: Vec<Option<i64>> = extracted
        .pair
        .ledger
        .column("devolution_id")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(keys, vec![Some(1), Some(2)]);
}

#[test]
fn failed_transform_leaves_no_staging() {
    let dir = TempDir::new().unwrap();
    let options = options(&dir, Selection::All, false);
    fs::write(
        &options.ledger,
        "Marca temporal,FAMILIA PRODUCTOS,FECHA NOTA,NOTA,MONTO,RECONOCIMIENTO,USUARIO,PDF NOTA,FORM PC,MES,ANO\n\
2024-06-26 13:53:43,VITAMINAS,2024-06-26,101407,37120,NO,ops@example.com,https://docs.example.com/2,NO,6,2024\n",
    )
    .unwrap();
    let config = TransformConfig::default();
    let ctx = TransformContext::with_capture_time(&config, captured());

    let err = run_batch(&options, &ctx).unwrap_err();
    insta::assert_snapshot!(
        format!("{err:#}"),
        @"transform batch: note_date row 0: '2024-06-26' does not match DD/MM/YYYY"
    );
    assert!(!options.staging_dir.exists());
}
