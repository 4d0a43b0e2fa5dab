//! Text cleanup.

/// Replaces newlines with spaces and trims the result.
pub fn collapse_newlines(value: &str) -> String {
    value.replace("\r\n", " ").replace('\n', " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(collapse_newlines("Product A\nwith newline"), "Product A with newline");
        assert_eq!(collapse_newlines(" CAUSA\r\n3 "), "CAUSA 3");
        assert_eq!(collapse_newlines(""), "");
    }
}
