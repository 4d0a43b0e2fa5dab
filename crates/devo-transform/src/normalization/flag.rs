//! Categorical flag mapping.

/// Raw flag value -> boolean. Any other value is a format error.
pub const FLAG_VALUES: [(&str, bool); 4] = [("SI", true), ("TEST", true), ("NO", false), ("", false)];

/// Maps a flag cell through [`FLAG_VALUES`] after trimming whitespace.
///
/// Matching is case-sensitive; `None` means the value is not in the table.
pub fn parse_flag(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    FLAG_VALUES
        .iter()
        .find(|(raw, _)| *raw == trimmed)
        .map(|(_, flag)| *flag)
}
