//! Payload field naming

use regex::Regex;
use std::sync::LazyLock;

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("static regex"));

static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("static regex"));

/// Underscored, lowercase form of a CamelCase word.
///
/// `DeviceType` -> `device_type`, `IOError` -> `io_error`, `kebab-case` -> `kebab_case`
pub fn underscore(word: &str) -> String {
    let word = ACRONYM_BOUNDARY.replace_all(word, "${1}_${2}");
    let word = WORD_BOUNDARY.replace_all(&word, "${1}_${2}");
    word.replace('-', "_").to_lowercase()
}

/// JSON field name carrying the payload of the given payload type.
///
/// Dot-separated segments are joined by underscores before conversion:
/// `Calculator.MathOperation` -> `calculator_math_operation`
pub fn field_name(payload_type: &str) -> String {
    underscore(&payload_type.replace('.', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("DeviceType"), "device_type");
        assert_eq!(underscore("IOError"), "io_error");
        assert_eq!(underscore("HTTPServerError"), "http_server_error");
        assert_eq!(underscore("kebab-case"), "kebab_case");
        assert_eq!(underscore("already_snake"), "already_snake");
        assert_eq!(underscore("Version2Upgrade"), "version2_upgrade");
    }

    #[test]
    fn test_field_name() {
        assert_eq!(field_name("MathOperation"), "math_operation");
        assert_eq!(field_name("Calculator.MathOperation"), "calculator_math_operation");
        assert_eq!(field_name("MissingPayloadType1a2b3c4d"), "missing_payload_type1a2b3c4d");
    }
}
