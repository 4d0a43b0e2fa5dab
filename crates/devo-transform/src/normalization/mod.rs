//! Value-level normalization rules.
//!
//! - **datetime**: timestamp and `DD/MM/YYYY` date parsing
//! - **numeric**: integers, leading-token quantities and currency amounts
//! - **flag**: the categorical flag table
//! - **text**: newline collapsing
//! - **executor**: applies the rules column by column, driven by the dataset schemas

pub mod datetime;
pub mod executor;
pub mod flag;
pub mod numeric;
pub mod text;

pub use datetime::{
    date_to_days, datetime_to_millis, parse_day_first_date, parse_timestamp,
};
pub use executor::{normalize_frame, normalize_types};
pub use flag::{FLAG_VALUES, parse_flag};
pub use numeric::{parse_currency_decimal, parse_integer, parse_leading_decimal};
pub use text::collapse_newlines;
