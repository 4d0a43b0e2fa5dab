//! Named, versioned schemas for the two datasets.
//!
//! Each dataset is described by an ordered list of [`FieldSpec`]s. A field
//! carries the coercion rule the normalizer applies to it, which in turn fixes
//! the polars storage type of the typed column. Schemas are checked at the
//! normalizer boundary: required columns on the way in, storage types on the
//! way out.

use polars::prelude::{DataFrame, DataType, TimeUnit};

use crate::error::{Result, SchemaError};

/// Surrogate key linking line items to their ledger row.
pub const DEVOLUTION_ID: &str = "devolution_id";

/// Capture time stamped on both datasets by the mapper.
pub const EXTRACTED_DATE: &str = "extracted_date";

/// Internal column names of the ledger dataset.
pub mod ledger {
    pub const ORIGINAL_TIMESTAMP: &str = "original_timestamp";
    pub const PRODUCT_FAMILY: &str = "product_family";
    pub const NOTE_DATE: &str = "note_date";
    pub const NOTE_NUMBER: &str = "note_number";
    pub const NOTE_AMOUNT: &str = "note_amount";
    pub const SHOULD_BE_PAID: &str = "should_be_paid";
    pub const USER: &str = "user";
    pub const DOCUMENT_URL: &str = "document_url";
    pub const ADDITIONAL_INFO: &str = "additional_info";
    pub const DETAILS_JT: &str = "details_jt";
    pub const WAS_UPLOADED: &str = "was_uploaded";
    pub const MONTH: &str = "month";
    pub const YEAR: &str = "year";
    pub const CONFIRMED_MONTH: &str = "confirmed_month";
}

/// Internal column names of the line-item dataset.
pub mod line_item {
    pub const CODE: &str = "code";
    pub const DESCRIPTION: &str = "description";
    pub const PVP: &str = "pvp";
    pub const QUANTITY: &str = "quantity";
    pub const TOTAL_AMOUNT: &str = "total_amount";
    pub const DEVOLUTION_TYPE: &str = "devolution_type";
    pub const DEVOLUTION_TYPE_GD: &str = "devolution_type_gd";
}

/// Polars storage type of a typed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Timestamp,
    Date,
    Integer,
    Boolean,
    Decimal,
    Text,
}

impl StorageType {
    /// The polars dtype a typed column of this kind must have.
    pub fn dtype(self) -> DataType {
        match self {
            Self::Timestamp => DataType::Datetime(TimeUnit::Milliseconds, None),
            Self::Date => DataType::Date,
            Self::Integer => DataType::Int64,
            Self::Boolean => DataType::Boolean,
            Self::Decimal => DataType::Float64,
            Self::Text => DataType::String,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Date => "date",
            Self::Integer => "integer",
            Self::Boolean => "nullable boolean",
            Self::Decimal => "decimal",
            Self::Text => "string",
        }
    }
}

/// How a raw string value is turned into its typed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Timestamp in any of the accepted layouts.
    Timestamp,
    /// Calendar date written strictly as `DD/MM/YYYY`.
    DayFirstDate,
    /// Whole number.
    Integer,
    /// Whole number; blanks take the configured default year.
    YearOrDefault,
    /// Categorical flag (`SI`/`TEST`/`NO`/empty) mapped to a boolean.
    Flag,
    /// Stored as-is.
    Text,
    /// Newlines replaced by spaces, surrounding whitespace trimmed.
    CollapsedText,
    /// First numeric token of a locale-formatted quantity.
    LeadingDecimal,
    /// Locale-formatted amount with optional currency symbol.
    CurrencyDecimal,
}

impl Coercion {
    pub fn storage(self) -> StorageType {
        match self {
            Self::Timestamp => StorageType::Timestamp,
            Self::DayFirstDate => StorageType::Date,
            Self::Integer | Self::YearOrDefault => StorageType::Integer,
            Self::Flag => StorageType::Boolean,
            Self::Text | Self::CollapsedText => StorageType::Text,
            Self::LeadingDecimal | Self::CurrencyDecimal => StorageType::Decimal,
        }
    }
}

/// Whether a field must be present after mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// One column of a dataset schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub coercion: Coercion,
    pub presence: Presence,
}

impl FieldSpec {
    pub const fn required(name: &'static str, coercion: Coercion) -> Self {
        Self {
            name,
            coercion,
            presence: Presence::Required,
        }
    }

    pub const fn optional(name: &'static str, coercion: Coercion) -> Self {
        Self {
            name,
            coercion,
            presence: Presence::Optional,
        }
    }

    pub fn storage(&self) -> StorageType {
        self.coercion.storage()
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }
}

/// Ordered, versioned field list for one dataset.
#[derive(Debug, Clone, Copy)]
pub struct DatasetSchema {
    /// Dataset name used in logs and errors.
    pub name: &'static str,
    /// Bumped whenever the field list changes.
    pub version: u32,
    /// Table the sink writer appends this dataset to.
    pub table: &'static str,
    pub fields: &'static [FieldSpec],
}

impl DatasetSchema {
    /// Look up a field by its internal name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.is_required())
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name).collect()
    }

    /// Fail on the first required field the frame does not carry.
    pub fn check_required(&self, df: &DataFrame) -> Result<()> {
        for field in self.required_fields() {
            if !has_column(df, field.name) {
                return Err(SchemaError::MissingColumn {
                    dataset: self.name,
                    column: field.name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Check that every schema field present in the frame has its storage type.
    ///
    /// Required fields must be present. Columns outside the schema are not
    /// inspected.
    pub fn check_storage(&self, df: &DataFrame) -> Result<()> {
        self.check_required(df)?;
        for field in self.fields {
            let Ok(column) = df.column(field.name) else {
                continue;
            };
            let expected = field.storage().dtype();
            if column.dtype() != &expected {
                return Err(SchemaError::TypeMismatch {
                    dataset: self.name,
                    column: field.name.to_string(),
                    expected: expected.to_string(),
                    actual: column.dtype().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Return-note entries sourced from the spreadsheet.
pub static LEDGER_SCHEMA: DatasetSchema = DatasetSchema {
    name: "ledger",
    version: 2,
    table: "devolutions",
    fields: &[
        FieldSpec::required(ledger::ORIGINAL_TIMESTAMP, Coercion::Timestamp),
        FieldSpec::required(ledger::PRODUCT_FAMILY, Coercion::Text),
        FieldSpec::required(ledger::NOTE_DATE, Coercion::DayFirstDate),
        FieldSpec::required(ledger::NOTE_NUMBER, Coercion::Integer),
        FieldSpec::required(ledger::NOTE_AMOUNT, Coercion::Integer),
        FieldSpec::required(ledger::SHOULD_BE_PAID, Coercion::Flag),
        FieldSpec::required(ledger::USER, Coercion::Text),
        FieldSpec::required(ledger::DOCUMENT_URL, Coercion::Text),
        FieldSpec::optional(ledger::ADDITIONAL_INFO, Coercion::Text),
        FieldSpec::optional(ledger::DETAILS_JT, Coercion::Text),
        FieldSpec::required(ledger::WAS_UPLOADED, Coercion::Flag),
        FieldSpec::required(ledger::MONTH, Coercion::Integer),
        FieldSpec::required(ledger::YEAR, Coercion::YearOrDefault),
        FieldSpec::optional(ledger::CONFIRMED_MONTH, Coercion::Text),
        FieldSpec::required(EXTRACTED_DATE, Coercion::Timestamp),
        FieldSpec::required(DEVOLUTION_ID, Coercion::Integer),
    ],
};

/// Line items scraped from the document linked by each ledger row.
pub static LINE_ITEM_SCHEMA: DatasetSchema = DatasetSchema {
    name: "line_items",
    version: 2,
    table: "pdf_devolutions",
    fields: &[
        FieldSpec::optional(line_item::CODE, Coercion::Text),
        FieldSpec::required(line_item::DESCRIPTION, Coercion::CollapsedText),
        FieldSpec::optional(line_item::PVP, Coercion::CurrencyDecimal),
        FieldSpec::required(line_item::QUANTITY, Coercion::LeadingDecimal),
        FieldSpec::optional(line_item::TOTAL_AMOUNT, Coercion::CurrencyDecimal),
        FieldSpec::optional(line_item::DEVOLUTION_TYPE, Coercion::CollapsedText),
        FieldSpec::optional(line_item::DEVOLUTION_TYPE_GD, Coercion::CollapsedText),
        FieldSpec::required(EXTRACTED_DATE, Coercion::Timestamp),
        FieldSpec::required(DEVOLUTION_ID, Coercion::Integer),
    ],
};

/// Returns true if the frame has a column with exactly this name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names()
        .iter()
        .any(|column| column.as_str() == name)
}
