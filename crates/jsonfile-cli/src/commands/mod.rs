//! Command handlers

pub mod document;

use serde_json::Value;

/// Parse a command-line value as JSON, falling back to a plain string
///
/// `42`, `true`, `[1,2]` and `{"a":1}` are JSON; `hello` becomes `"hello"`.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value_json() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("{\"a\": [true]}"), json!({"a": [true]}));
        assert_eq!(parse_value("null"), Value::Null);
        assert_eq!(parse_value("\"quoted\""), json!("quoted"));
    }

    #[test]
    fn test_parse_value_plain_string() {
        assert_eq!(parse_value("hello world"), json!("hello world"));
        assert_eq!(parse_value("{broken"), json!("{broken"));
    }
}
