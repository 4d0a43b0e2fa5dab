//! Numeric parsing for integers, quantities and currency amounts.

use std::sync::LazyLock;

use regex::Regex;

use devo_model::CurrencyLocale;

/// First run of digits, optionally followed by a dot and more digits.
static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.?\d*").expect("valid numeric token regex"));

/// Parses a whole number, ignoring surrounding whitespace.
pub fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// Extracts the first numeric token of a quantity cell.
///
/// The decimal separator is turned into a dot first, so `"1,5 unid"` reads as
/// `1.5`. Returns `None` when the cell holds no digits.
pub fn parse_leading_decimal(value: &str, decimal_separator: char) -> Option<f64> {
    let normalized = value.replace(decimal_separator, ".");
    NUMERIC_TOKEN
        .find(&normalized)
        .and_then(|token| token.as_str().parse::<f64>().ok())
}

/// Parses a locale-formatted amount such as `"$ 1.234,50"`.
///
/// Returns `None` for blank or malformed values; callers decide whether a
/// blank is an error.
pub fn parse_currency_decimal(value: &str, locale: &CurrencyLocale) -> Option<f64> {
    let mut cleaned = value.trim().to_string();
    if !locale.currency_symbol.is_empty() {
        cleaned = cleaned.replace(locale.currency_symbol.as_str(), "");
    }
    let cleaned: String = cleaned
        .chars()
        .filter(|c| !c.is_whitespace() && *c != locale.thousands_separator)
        .map(|c| if c == locale.decimal_separator { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
