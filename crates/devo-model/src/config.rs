//! Transform configuration.
//!
//! Every table and constant the transform stage depends on lives in
//! [`TransformConfig`]. The defaults reproduce the production spreadsheet and
//! document layouts; a TOML file can override any top-level section.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::{EXTRACTED_DATE, ledger, line_item};

/// Target name for raw headers whose columns are discarded.
pub const DEFAULT_UNUSED_SENTINEL: &str = "not_used_column";

/// Year used when a ledger row leaves the year blank.
pub const DEFAULT_YEAR: i32 = 2024;

/// Number formatting of currency amounts in the source documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyLocale {
    /// Symbol stripped before parsing (e.g. `$`).
    pub currency_symbol: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl Default for CurrencyLocale {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
        }
    }
}

/// Explicit configuration of the transform stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Mapping target marking a raw column as discarded.
    pub unused_sentinel_name: String,
    pub default_year: i32,
    pub currency_locale: CurrencyLocale,
    /// Spreadsheet header -> internal ledger column.
    pub ledger_column_map: BTreeMap<String, String>,
    /// Document table header -> internal line-item column.
    pub line_item_column_map: BTreeMap<String, String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            unused_sentinel_name: DEFAULT_UNUSED_SENTINEL.to_string(),
            default_year: DEFAULT_YEAR,
            currency_locale: CurrencyLocale::default(),
            ledger_column_map: default_ledger_column_map(),
            line_item_column_map: default_line_item_column_map(),
        }
    }
}

impl TransformConfig {
    /// Parse a TOML document and validate the result.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            origin: "<string>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            origin: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configurations that would make the mapper collide columns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unused_sentinel_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "unused_sentinel_name must not be empty".to_string(),
            ));
        }
        if self.default_year <= 0 {
            return Err(ConfigError::Invalid(format!(
                "default_year must be positive, got {}",
                self.default_year
            )));
        }
        let locale = &self.currency_locale;
        if locale.thousands_separator == locale.decimal_separator {
            return Err(ConfigError::Invalid(format!(
                "currency separators must differ, both are '{}'",
                locale.decimal_separator
            )));
        }
        self.validate_map("ledger_column_map", &self.ledger_column_map)?;
        self.validate_map("line_item_column_map", &self.line_item_column_map)?;
        Ok(())
    }

    fn validate_map(
        &self,
        label: &str,
        map: &BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for (source, target) in map {
            if target.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{label}: header '{source}' maps to an empty name"
                )));
            }
            if target == EXTRACTED_DATE {
                return Err(ConfigError::Invalid(format!(
                    "{label}: header '{source}' maps to reserved column '{EXTRACTED_DATE}'"
                )));
            }
            if self.is_sentinel_target(target) {
                continue;
            }
            if self.is_unused_column(target) {
                return Err(ConfigError::Invalid(format!(
                    "{label}: header '{source}' maps to '{target}', which is reserved for discarded columns"
                )));
            }
            if let Some(previous) = seen.insert(target.as_str(), source.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "{label}: headers '{previous}' and '{source}' both map to '{target}'"
                )));
            }
        }
        Ok(())
    }

    /// True when a mapping target sends its column to the discard bucket.
    ///
    /// [`DEFAULT_UNUSED_SENTINEL`] always counts, so the built-in tables keep
    /// working when only `unused_sentinel_name` is overridden.
    pub fn is_sentinel_target(&self, target: &str) -> bool {
        target == self.unused_sentinel_name || target == DEFAULT_UNUSED_SENTINEL
    }

    /// True for the sentinel itself and its numbered forms (`<sentinel>_2`, ...).
    pub fn is_unused_column(&self, name: &str) -> bool {
        let sentinel = self.unused_sentinel_name.as_str();
        if name == sentinel {
            return true;
        }
        name.strip_prefix(sentinel)
            .and_then(|rest| rest.strip_prefix('_'))
            .is_some_and(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()))
    }
}

fn build_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(source, target)| ((*source).to_string(), (*target).to_string()))
        .collect()
}

/// Headers of the return-notes spreadsheet.
pub fn default_ledger_column_map() -> BTreeMap<String, String> {
    build_map(&[
        ("Marca temporal", ledger::ORIGINAL_TIMESTAMP),
        ("FAMILIA PRODUCTOS", ledger::PRODUCT_FAMILY),
        ("FECHA NOTA", ledger::NOTE_DATE),
        ("NOTA", ledger::NOTE_NUMBER),
        ("MONTO", ledger::NOTE_AMOUNT),
        ("RECONOCIMIENTO", ledger::SHOULD_BE_PAID),
        ("USUARIO", ledger::USER),
        ("PDF NOTA", ledger::DOCUMENT_URL),
        ("OSERVACIONES", ledger::ADDITIONAL_INFO),
        ("FECHA", DEFAULT_UNUSED_SENTINEL),
        ("IDDEVOLUCION", DEFAULT_UNUSED_SENTINEL),
        ("DETALLES JT", ledger::DETAILS_JT),
        ("FORM PC", ledger::WAS_UPLOADED),
        ("MES", ledger::MONTH),
        ("ANO", ledger::YEAR),
        ("MES CONFIRMADA", ledger::CONFIRMED_MONTH),
    ])
}

/// Headers of the tables scraped from the return documents.
///
/// Both spellings of the return-reason header are kept apart.
pub fn default_line_item_column_map() -> BTreeMap<String, String> {
    build_map(&[
        ("Código", line_item::CODE),
        ("Descripción", line_item::DESCRIPTION),
        ("PVP", line_item::PVP),
        ("Cantidad", line_item::QUANTITY),
        ("Total", line_item::TOTAL_AMOUNT),
        ("Articulo en\nfalta", DEFAULT_UNUSED_SENTINEL),
        ("Causa de\ndevolucion", line_item::DEVOLUTION_TYPE),
        ("Causa de\ndevolución", line_item::DEVOLUTION_TYPE_GD),
        ("Incluido\nAlbaran", DEFAULT_UNUSED_SENTINEL),
        ("ComCalid", DEFAULT_UNUSED_SENTINEL),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        TransformConfig::default().validate().unwrap();
    }

    #[test]
    fn test_unused_column_names() {
        let config = TransformConfig::default();
        assert!(config.is_unused_column("not_used_column"));
        assert!(config.is_unused_column("not_used_column_2"));
        assert!(!config.is_unused_column("not_used_column_"));
        assert!(!config.is_unused_column("not_used_column_x"));
        assert!(!config.is_unused_column("not_used_date"));
    }

    #[test]
    fn test_default_sentinel_is_a_placeholder() {
        let config = TransformConfig {
            unused_sentinel_name: "discard".to_string(),
            ..TransformConfig::default()
        };
        assert!(config.is_sentinel_target("discard"));
        assert!(config.is_sentinel_target(DEFAULT_UNUSED_SENTINEL));
        assert!(!config.is_sentinel_target("discard_2"));
        assert!(config.is_unused_column("discard_2"));
        assert!(!config.is_unused_column("not_used_column_2"));
        config.validate().unwrap();
    }

    #[test]
    fn test_return_reason_headers_stay_distinct() {
        let map = default_line_item_column_map();
        assert_ne!(
            map.get("Causa de\ndevolucion"),
            map.get("Causa de\ndevolución")
        );
    }
}
