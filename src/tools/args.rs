//! Argument validation shared by the GIS tools.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("Expected {expected} comma-separated values in the form '{format}', got {got}: {input:?}")]
    WrongCount {
        expected: usize,
        got: usize,
        format: &'static str,
        input: String,
    },

    #[error("Could not convert {value:?} to a number for '{field}'")]
    NotANumber { field: &'static str, value: String },

    #[error("Invalid arguments for {tool}: {reason}")]
    Invalid { tool: &'static str, reason: String },
}

/// The legacy single-string argument, if the call used that convention.
pub(crate) fn string_form(args: &Value) -> Option<&str> {
    match args {
        Value::String(s) => Some(s),
        Value::Object(map) if map.len() == 1 => map.get("input").and_then(Value::as_str),
        _ => None,
    }
}

/// Split `input` on commas into exactly `expected` trimmed parts.
pub(crate) fn split_positional<'a>(
    input: &'a str,
    expected: usize,
    format: &'static str,
) -> Result<Vec<&'a str>, ArgumentError> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != expected || parts.iter().any(|p| p.is_empty()) {
        return Err(ArgumentError::WrongCount {
            expected,
            got: parts.iter().filter(|p| !p.is_empty()).count(),
            format,
            input: input.to_string(),
        });
    }
    Ok(parts)
}

pub(crate) fn parse_number(field: &'static str, raw: &str) -> Result<f64, ArgumentError> {
    raw.trim().parse().map_err(|_| ArgumentError::NotANumber {
        field,
        value: raw.to_string(),
    })
}

/// Deserialize structured arguments into `T`.
pub(crate) fn from_object<T: DeserializeOwned>(
    tool: &'static str,
    args: Value,
) -> Result<T, ArgumentError> {
    serde_json::from_value(args).map_err(|e| ArgumentError::Invalid {
        tool,
        reason: e.to_string(),
    })
}

/// Accept either a JSON number or a numeric string.
pub(crate) fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("could not convert {:?} to a number", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_form_accepts_bare_strings_and_input_key() {
        assert_eq!(string_form(&json!("a,b")), Some("a,b"));
        assert_eq!(string_form(&json!({"input": "a,b"})), Some("a,b"));
        assert_eq!(string_form(&json!({"layer": "a"})), None);
    }

    #[test]
    fn split_positional_trims_parts() {
        let parts = split_positional(" school_zones , 500 ", 2, "layer,distance").unwrap();
        assert_eq!(parts, vec!["school_zones", "500"]);
    }

    #[test]
    fn split_positional_rejects_wrong_count() {
        let err = split_positional("school_zones", 2, "layer,distance").unwrap_err();
        assert!(matches!(err, ArgumentError::WrongCount { expected: 2, got: 1, .. }));
    }

    #[test]
    fn parse_number_reports_bad_value() {
        let err = parse_number("distance", "five hundred").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not convert \"five hundred\" to a number for 'distance'"
        );
    }
}
