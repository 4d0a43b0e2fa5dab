//! Tests for schemas and transform configuration.

use std::io::Write;

use devo_model::{
    ConfigError, DEFAULT_YEAR, LEDGER_SCHEMA, LINE_ITEM_SCHEMA, SchemaError, TransformConfig,
    ledger,
};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tempfile::NamedTempFile;

fn string_frame(columns: &[&str]) -> DataFrame {
    let cols: Vec<Column> = columns
        .iter()
        .map(|name| Series::new((*name).into(), vec!["1".to_string()]).into_column())
        .collect();
    DataFrame::new(cols).unwrap()
}

#[test]
fn partial_toml_overrides_only_named_fields() {
    let config = TransformConfig::from_toml_str(
        r#"
default_year = 2025

[currency_locale]
currency_symbol = "€"
"#,
    )
    .unwrap();

    assert_eq!(config.default_year, 2025);
    assert_eq!(config.currency_locale.currency_symbol, "€");
    assert_eq!(config.currency_locale.thousands_separator, '.');
    assert_eq!(config.currency_locale.decimal_separator, ',');
    assert_eq!(
        config.ledger_column_map.get("MONTO").map(String::as_str),
        Some(ledger::NOTE_AMOUNT)
    );
}

#[test]
fn config_round_trips_through_toml() {
    let config = TransformConfig::default();
    let rendered = config.to_toml_string().unwrap();
    let parsed = TransformConfig::from_toml_str(&rendered).unwrap();
    assert_eq!(parsed, config);
    assert_eq!(parsed.default_year, DEFAULT_YEAR);
}

#[test]
fn duplicate_targets_are_rejected() {
    let err = TransformConfig::from_toml_str(
        r#"
[ledger_column_map]
"MONTO" = "note_amount"
"IMPORTE" = "note_amount"
"#,
    )
    .unwrap_err();

    insta::assert_snapshot!(
        err.to_string(),
        @"invalid config: ledger_column_map: headers 'IMPORTE' and 'MONTO' both map to 'note_amount'"
    );
}

#[test]
fn several_headers_may_share_the_sentinel() {
    let config = TransformConfig::from_toml_str(
        r#"
[line_item_column_map]
"Cantidad" = "quantity"
"ComCalid" = "not_used_column"
"Incluido\nAlbaran" = "not_used_column"
"#,
    )
    .unwrap();
    assert_eq!(config.line_item_column_map.len(), 3);
}

#[test]
fn sentinel_name_can_be_overridden_alone() {
    let config = TransformConfig::from_toml_str(r#"unused_sentinel_name = "discard""#).unwrap();
    assert_eq!(config.unused_sentinel_name, "discard");
    assert!(config.is_sentinel_target(
        config.ledger_column_map.get("FECHA").map(String::as_str).unwrap()
    ));
}

#[test]
fn numbered_sentinel_targets_are_reserved() {
    let err = TransformConfig::from_toml_str(
        r#"
[line_item_column_map]
"Extra" = "not_used_column_2"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn equal_separators_are_rejected() {
    let err = TransformConfig::from_toml_str(
        r#"
[currency_locale]
thousands_separator = ","
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn load_reports_path_on_parse_failure() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "default_year = \"soon\"").unwrap();

    let err = TransformConfig::load(file.path()).unwrap_err();
    match err {
        ConfigError::Parse { origin, .. } => {
            assert_eq!(origin, file.path().display().to_string());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn load_missing_file_is_a_read_error() {
    let err = TransformConfig::load(std::path::Path::new("/nonexistent/devo.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn check_required_names_first_missing_column() {
    let df = string_frame(&["original_timestamp", "product_family", "note_date"]);
    let err = LEDGER_SCHEMA.check_required(&df).unwrap_err();
    assert_eq!(
        err,
        SchemaError::MissingColumn {
            dataset: "ledger",
            column: "note_number".to_string(),
        }
    );
}

#[test]
fn check_storage_flags_untyped_columns() {
    let df = string_frame(&[
        "description",
        "quantity",
        "extracted_date",
        "devolution_id",
    ]);
    let err = LINE_ITEM_SCHEMA.check_storage(&df).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::TypeMismatch { ref column, .. } if column == "quantity"
    ));
}

#[test]
fn ledger_without_document_link_is_rejected() {
    let mut columns: Vec<&str> = LEDGER_SCHEMA
        .required_fields()
        .map(|field| field.name)
        .collect();
    columns.retain(|name| *name != ledger::DOCUMENT_URL);
    let df = string_frame(&columns);

    let err = LEDGER_SCHEMA.check_required(&df).unwrap_err();
    assert_eq!(
        err,
        SchemaError::MissingColumn {
            dataset: "ledger",
            column: ledger::DOCUMENT_URL.to_string(),
        }
    );
}
