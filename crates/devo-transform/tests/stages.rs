//! Tests for the individual transform stages.

use chrono::NaiveDate;
use devo_model::{LINE_ITEM_SCHEMA, SchemaError, TransformConfig};
use devo_transform::{
    DatasetPair, TransformContext, TransformError, map_columns, normalize_frame, prune,
};
use polars::prelude::*;

fn string_column(name: &str, values: &[&str]) -> Column {
    Series::new(
        name.into(),
        values.iter().map(|v| (*v).to_string()).collect::<Vec<_>>(),
    )
    .into_column()
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

fn context(config: &TransformConfig) -> TransformContext<'_> {
    let captured = NaiveDate::from_ymd_opt(2024, 6, 27)
        .unwrap()
        .and_hms_opt(3, 0, 0)
        .unwrap();
    TransformContext::with_capture_time(config, captured)
}

fn typed_line_items(columns: Vec<Column>) -> DataFrame {
    let mut cols = columns;
    cols.push(string_column("extracted_date", &["2024-06-27 03:00:00"; 2]));
    cols.push(string_column("devolution_id", &["0", "1"]));
    DataFrame::new(cols).unwrap()
}

#[test]
fn mapper_leaves_internal_names_alone() {
    let config = TransformConfig::default();
    let ledger = DataFrame::new(vec![
        string_column("note_number", &["101407"]),
        string_column("devolution_id", &["5"]),
    ])
    .unwrap();
    let line_items = DataFrame::new(vec![
        string_column("quantity", &["1"]),
        string_column("devolution_id", &["5"]),
    ])
    .unwrap();

    let mapped = map_columns(DatasetPair::new(ledger, line_items), &context(&config)).unwrap();

    assert_eq!(
        column_names(&mapped.ledger),
        vec!["note_number", "devolution_id", "extracted_date"]
    );
    assert_eq!(
        column_names(&mapped.line_items),
        vec!["quantity", "devolution_id", "extracted_date"]
    );
    let key = mapped.ledger.column("devolution_id").unwrap().str().unwrap();
    assert_eq!(key.get(0), Some("5"));
}

#[test]
fn mapper_keeps_return_reason_spellings_apart() {
    let config = TransformConfig::default();
    let ledger = DataFrame::new(vec![string_column("NOTA", &["1"])]).unwrap();
    let line_items = DataFrame::new(vec![
        string_column("Causa de\ndevolucion", &["CAUSA 1"]),
        string_column("Causa de\ndevolución", &["CAUSA 2"]),
    ])
    .unwrap();

    let mapped = map_columns(DatasetPair::new(ledger, line_items), &context(&config)).unwrap();

    let names = column_names(&mapped.line_items);
    assert!(names.contains(&"devolution_type".to_string()));
    assert!(names.contains(&"devolution_type_gd".to_string()));
    assert_eq!(
        column_names(&mapped.ledger),
        vec!["note_number", "devolution_id", "extracted_date"]
    );
}

#[test]
fn mapper_rejects_colliding_targets() {
    let config = TransformConfig::default();
    let ledger = DataFrame::new(vec![
        string_column("NOTA", &["1"]),
        string_column("note_number", &["1"]),
    ])
    .unwrap();
    let line_items = DataFrame::new(vec![string_column("Cantidad", &["1"])]).unwrap();

    let err = map_columns(DatasetPair::new(ledger, line_items), &context(&config)).unwrap_err();
    assert!(matches!(
        err,
        TransformError::Schema(SchemaError::DuplicateColumn { dataset: "ledger", .. })
    ));
}

#[test]
fn pruner_requires_quantity() {
    let config = TransformConfig::default();
    let ledger = DataFrame::new(vec![string_column("note_number", &["1"])]).unwrap();
    let line_items = DataFrame::new(vec![string_column("description", &["A"])]).unwrap();

    let err = prune(DatasetPair::new(ledger, line_items), &config).unwrap_err();
    assert!(matches!(
        err,
        TransformError::Schema(SchemaError::MissingColumn { dataset: "line_items", .. })
    ));
}

#[test]
fn pruner_handles_numeric_quantities() {
    let config = TransformConfig::default();
    let ledger = DataFrame::new(vec![
        string_column("note_number", &["1"]),
        string_column("not_used_column", &["x"]),
    ])
    .unwrap();
    let line_items = DataFrame::new(vec![
        Series::new("quantity".into(), vec![Some(0.0f64), None, Some(2.5)]).into_column(),
        string_column("devolution_id", &["0", "0", "0"]),
    ])
    .unwrap();

    let pruned = prune(DatasetPair::new(ledger, line_items), &config).unwrap();
    assert_eq!(pruned.ledger.width(), 1);
    assert_eq!(pruned.ledger_rows(), 1);
    assert_eq!(pruned.line_item_rows(), 1);
}

#[test]
fn currency_amounts_follow_the_locale() {
    let config = TransformConfig::default();
    let df = typed_line_items(vec![
        string_column("description", &["A", "B"]),
        string_column("quantity", &["1", "2"]),
        string_column("pvp", &["1.234,56", "$ 99"]),
        string_column("total_amount", &["37120", ""]),
    ]);

    let typed = normalize_frame(df, &LINE_ITEM_SCHEMA, &config).unwrap();

    let pvp: Vec<Option<f64>> = typed.column("pvp").unwrap().f64().unwrap().into_iter().collect();
    assert_eq!(pvp, vec![Some(1234.56), Some(99.0)]);
    let totals: Vec<Option<f64>> = typed
        .column("total_amount")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(totals, vec![Some(37120.0), None]);
}

#[test]
fn absent_optional_columns_stay_absent() {
    let config = TransformConfig::default();
    let df = typed_line_items(vec![
        string_column("description", &["A", "B"]),
        string_column("quantity", &["1,5 unid", "2"]),
    ]);

    let typed = normalize_frame(df, &LINE_ITEM_SCHEMA, &config).unwrap();

    assert!(typed.column("total_amount").is_err());
    assert!(typed.column("pvp").is_err());
    let quantities: Vec<Option<f64>> = typed
        .column("quantity")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(quantities, vec![Some(1.5), Some(2.0)]);
}

#[test]
fn all_null_optional_column_is_only_cast() {
    let config = TransformConfig::default();
    let df = typed_line_items(vec![
        string_column("description", &["A", "B"]),
        string_column("quantity", &["1", "2"]),
        Series::new("total_amount".into(), vec![None::<&str>, None]).into_column(),
    ]);

    let typed = normalize_frame(df, &LINE_ITEM_SCHEMA, &config).unwrap();
    let totals = typed.column("total_amount").unwrap();
    assert_eq!(totals.dtype(), &DataType::Float64);
    assert_eq!(totals.null_count(), 2);
}

#[test]
fn typed_input_is_left_as_is() {
    let config = TransformConfig::default();
    let df = typed_line_items(vec![
        string_column("description", &["A", "B"]),
        string_column("quantity", &["1", "2"]),
    ]);
    let once = normalize_frame(df, &LINE_ITEM_SCHEMA, &config).unwrap();
    let twice = normalize_frame(once.clone(), &LINE_ITEM_SCHEMA, &config).unwrap();
    assert!(once.equals_missing(&twice));
}

#[test]
fn custom_sentinel_columns_are_pruned() {
    let config = TransformConfig::from_toml_str(r#"unused_sentinel_name = "discard""#).unwrap();
    let ledger = DataFrame::new(vec![
        string_column("FECHA", &["26/06/2024"]),
        string_column("NOTA", &["101407"]),
        string_column("IDDEVOLUCION", &["77"]),
    ])
    .unwrap();
    let line_items = DataFrame::new(vec![
        string_column("Cantidad", &["1"]),
        string_column("ComCalid", &["x"]),
        string_column("devolution_id", &["0"]),
    ])
    .unwrap();

    let mapped = map_columns(DatasetPair::new(ledger, line_items), &context(&config)).unwrap();
    assert_eq!(
        column_names(&mapped.ledger),
        vec!["discard", "note_number", "discard_2", "devolution_id", "extracted_date"]
    );

    let pruned = prune(mapped, &config).unwrap();
    assert_eq!(
        column_names(&pruned.ledger),
        vec!["note_number", "devolution_id", "extracted_date"]
    );
    assert_eq!(
        column_names(&pruned.line_items),
        vec!["quantity", "devolution_id", "extracted_date"]
    );
}

#[test]
fn text_columns_are_collapsed() {
    let config = TransformConfig::default();
    let df = typed_line_items(vec![
        string_column("description", &["Product A\nwith newline ", " Product B"]),
        string_column("quantity", &["1", "2"]),
        string_column("devolution_type", &[" CAUSA\n3 ", "CAUSA 1"]),
    ]);

    let typed = normalize_frame(df, &LINE_ITEM_SCHEMA, &config).unwrap();

    let descriptions = typed.column("description").unwrap().str().unwrap();
    assert_eq!(descriptions.get(0), Some("Product A with newline"));
    assert_eq!(descriptions.get(1), Some("Product B"));
    let reasons = typed.column("devolution_type").unwrap().str().unwrap();
    assert_eq!(reasons.get(0), Some("CAUSA 3"));
    assert_eq!(reasons.get(1), Some("CAUSA 1"));
}

#[test]
fn fractional_float_key_is_rejected() {
    let config = TransformConfig::default();
    let df = DataFrame::new(vec![
        string_column("description", &["A", "B"]),
        Series::new("quantity".into(), vec![1.5f64, 2.0]).into_column(),
        string_column("extracted_date", &["2024-06-27 03:00:00"; 2]),
        Series::new("devolution_id".into(), vec![0.0f64, 1.5]).into_column(),
    ])
    .unwrap();

    let err = normalize_frame(df, &LINE_ITEM_SCHEMA, &config).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"devolution_id row 1: '1.5' is not an integer");
}
