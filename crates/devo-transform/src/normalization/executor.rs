//! Schema-driven column coercion.
//!
//! Each field of a [`DatasetSchema`] names the rule that turns its raw column
//! into the typed form. Required columns are checked before any value is
//! touched and storage types are checked once every field has been coerced.

use polars::prelude::*;

use devo_model::{
    Coercion, DatasetSchema, FieldSpec, LEDGER_SCHEMA, LINE_ITEM_SCHEMA, TransformConfig,
};

use crate::error::{FormatError, Result};
use crate::frame::DatasetPair;
use crate::normalization::{
    collapse_newlines, date_to_days, datetime_to_millis, parse_currency_decimal,
    parse_day_first_date, parse_flag, parse_integer, parse_leading_decimal, parse_timestamp,
};

/// Coerces both datasets to their schema types.
pub fn normalize_types(pair: DatasetPair, config: &TransformConfig) -> Result<DatasetPair> {
    let (ledger, line_items) = pair.into_parts();
    let ledger = normalize_frame(ledger, &LEDGER_SCHEMA, config)?;
    let line_items = normalize_frame(line_items, &LINE_ITEM_SCHEMA, config)?;
    Ok(DatasetPair::new(ledger, line_items))
}

/// Coerces one dataset to `schema`.
///
/// Columns outside the schema pass through untouched. Optional fields that
/// are absent stay absent; optional fields holding only nulls are cast to
/// their storage type without parsing.
pub fn normalize_frame(
    mut df: DataFrame,
    schema: &DatasetSchema,
    config: &TransformConfig,
) -> Result<DataFrame> {
    schema.check_required(&df)?;

    let mut coerced = 0usize;
    for field in schema.fields {
        let Ok(column) = df.column(field.name) else {
            continue;
        };
        let target = field.storage().dtype();
        if column.dtype() == &target && field.coercion != Coercion::CollapsedText {
            continue;
        }
        let series = if !field.is_required() && column.null_count() == column.len() {
            tracing::warn!(
                dataset = schema.name,
                column = field.name,
                "optional column holds only nulls"
            );
            column.as_materialized_series().cast(&target)?
        } else {
            execute_field(column, field, config)?
        };
        df.with_column(series)?;
        coerced += 1;
    }

    schema.check_storage(&df)?;
    tracing::debug!(
        dataset = schema.name,
        rows = df.height(),
        coerced,
        "normalized column types"
    );
    Ok(df)
}

fn execute_field(column: &Column, field: &FieldSpec, config: &TransformConfig) -> Result<Series> {
    let target = field.storage().dtype();

    // Already numeric or temporal sources are cast rather than re-parsed.
    match field.coercion {
        Coercion::Integer
        | Coercion::YearOrDefault
        | Coercion::LeadingDecimal
        | Coercion::CurrencyDecimal
            if column.dtype().is_primitive_numeric() =>
        {
            return cast_numeric(column, field, config);
        }
        Coercion::Timestamp | Coercion::DayFirstDate
            if matches!(column.dtype(), DataType::Date | DataType::Datetime(_, _)) =>
        {
            return Ok(column.as_materialized_series().strict_cast(&target)?);
        }
        _ => {}
    }

    let strings = column.cast(&DataType::String)?;
    let values = strings.str()?;
    let name = field.name;

    let series = match field.coercion {
        Coercion::Timestamp => {
            let mut out: Vec<Option<i64>> = Vec::with_capacity(values.len());
            for (row, value) in values.into_iter().enumerate() {
                out.push(match value {
                    Some(raw) if !raw.trim().is_empty() => {
                        let parsed = parse_timestamp(raw).ok_or_else(|| FormatError::Timestamp {
                            column: name.to_string(),
                            row,
                            value: raw.to_string(),
                        })?;
                        Some(datetime_to_millis(parsed))
                    }
                    _ => None,
                });
            }
            Series::new(name.into(), out).cast(&target)?
        }
        Coercion::DayFirstDate => {
            let mut out: Vec<Option<i32>> = Vec::with_capacity(values.len());
            for (row, value) in values.into_iter().enumerate() {
                out.push(match value {
                    Some(raw) if !raw.trim().is_empty() => {
                        let parsed = parse_day_first_date(raw).ok_or_else(|| FormatError::Date {
                            column: name.to_string(),
                            row,
                            value: raw.to_string(),
                        })?;
                        Some(date_to_days(parsed))
                    }
                    _ => None,
                });
            }
            Series::new(name.into(), out).cast(&target)?
        }
        Coercion::Integer => {
            let mut out: Vec<i64> = Vec::with_capacity(values.len());
            for (row, value) in values.into_iter().enumerate() {
                let raw = value.unwrap_or_default();
                let parsed = parse_integer(raw).ok_or_else(|| FormatError::Integer {
                    column: name.to_string(),
                    row,
                    value: raw.to_string(),
                })?;
                out.push(parsed);
            }
            Series::new(name.into(), out)
        }
        Coercion::YearOrDefault => {
            let default_year = i64::from(config.default_year);
            let mut out: Vec<i64> = Vec::with_capacity(values.len());
            for (row, value) in values.into_iter().enumerate() {
                let parsed = match value {
                    Some(raw) if !raw.trim().is_empty() => {
                        parse_integer(raw).ok_or_else(|| FormatError::Integer {
                            column: name.to_string(),
                            row,
                            value: raw.to_string(),
                        })?
                    }
                    _ => default_year,
                };
                out.push(parsed);
            }
            Series::new(name.into(), out)
        }
        Coercion::Flag => {
            let mut out: Vec<Option<bool>> = Vec::with_capacity(values.len());
            for (row, value) in values.into_iter().enumerate() {
                out.push(match value {
                    Some(raw) => Some(parse_flag(raw).ok_or_else(|| FormatError::Flag {
                        column: name.to_string(),
                        row,
                        value: raw.to_string(),
                    })?),
                    None => None,
                });
            }
            Series::new(name.into(), out)
        }
        Coercion::Text => strings.as_materialized_series().clone(),
        Coercion::CollapsedText => {
            let out: Vec<Option<String>> = values
                .into_iter()
                .map(|value| value.map(collapse_newlines))
                .collect();
            Series::new(name.into(), out)
        }
        Coercion::LeadingDecimal => {
            let separator = config.currency_locale.decimal_separator;
            let mut out: Vec<f64> = Vec::with_capacity(values.len());
            for (row, value) in values.into_iter().enumerate() {
                let raw = value.unwrap_or_default();
                let parsed = parse_leading_decimal(raw, separator).ok_or_else(|| {
                    FormatError::Quantity {
                        column: name.to_string(),
                        row,
                        value: raw.to_string(),
                    }
                })?;
                out.push(parsed);
            }
            Series::new(name.into(), out)
        }
        Coercion::CurrencyDecimal => {
            let locale = &config.currency_locale;
            let mut out: Vec<Option<f64>> = Vec::with_capacity(values.len());
            for (row, value) in values.into_iter().enumerate() {
                out.push(match value {
                    Some(raw) if !raw.trim().is_empty() => {
                        Some(parse_currency_decimal(raw, locale).ok_or_else(|| {
                            FormatError::Decimal {
                                column: name.to_string(),
                                row,
                                value: raw.to_string(),
                            }
                        })?)
                    }
                    _ => None,
                });
            }
            Series::new(name.into(), out)
        }
    };

    tracing::trace!(column = name, rule = ?field.coercion, "coerced column");
    Ok(series)
}

/// Casts an already numeric column, applying the same row rules as text input.
///
/// Integer targets reject fractional and non-finite values instead of
/// truncating them. Numeric year columns still take the default where null.
fn cast_numeric(column: &Column, field: &FieldSpec, config: &TransformConfig) -> Result<Series> {
    let floats = column.cast(&DataType::Float64)?;
    let values = floats.f64()?;
    let name = field.name;
    let shown = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();

    let series = match field.coercion {
        Coercion::Integer | Coercion::YearOrDefault => {
            let default_year = i64::from(config.default_year);
            let mut out: Vec<i64> = Vec::with_capacity(values.len());
            for (row, value) in values.into_iter().enumerate() {
                let parsed = match value {
                    None if field.coercion == Coercion::YearOrDefault => Some(default_year),
                    Some(v) if v.is_finite() && v.fract() == 0.0 => {
                        let whole = v as i64;
                        (whole as f64 == v).then_some(whole)
                    }
                    _ => None,
                };
                out.push(parsed.ok_or_else(|| FormatError::Integer {
                    column: name.to_string(),
                    row,
                    value: shown(value),
                })?);
            }
            Series::new(name.into(), out)
        }
        Coercion::LeadingDecimal => {
            let mut out: Vec<f64> = Vec::with_capacity(values.len());
            for (row, value) in values.into_iter().enumerate() {
                match value {
                    Some(v) if v.is_finite() => out.push(v),
                    _ => {
                        return Err(FormatError::Quantity {
                            column: name.to_string(),
                            row,
                            value: shown(value),
                        }
                        .into());
                    }
                }
            }
            Series::new(name.into(), out)
        }
        _ => {
            let mut out: Vec<Option<f64>> = Vec::with_capacity(values.len());
            for (row, value) in values.into_iter().enumerate() {
                match value {
                    Some(v) if !v.is_finite() => {
                        return Err(FormatError::Decimal {
                            column: name.to_string(),
                            row,
                            value: v.to_string(),
                        }
                        .into());
                    }
                    other => out.push(other),
                }
            }
            Series::new(name.into(), out)
        }
    };
    Ok(series)
}
