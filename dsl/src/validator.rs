//! Schema validation for raw keyword/value pairs.
//!
//! Every entity in an interface definition is declared as a run of
//! keyword/value pairs. The parser collects the raw pairs and each entity
//! validates them against its fixed schema before construction.

use std::collections::HashMap;

use ifagen_problems::Problem;

use crate::core::SourceSpan;
use crate::diagnostic::{Diagnostic, Label};

/// The declared type of a property in a schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaType {
    Str,
    Int,
}

impl SchemaType {
    fn name(&self) -> &'static str {
        match self {
            SchemaType::Str => "string",
            SchemaType::Int => "integer",
        }
    }
}

/// A property value after coercion to its declared type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
}

/// The result of validating raw pairs against a schema.
///
/// Accessors return diagnostics rather than panicking so that entity
/// constructors can propagate with `?` even though validation guarantees
/// the keys are present.
#[derive(Debug)]
pub struct Validated {
    values: HashMap<String, Value>,
    span: SourceSpan,
}

impl Validated {
    pub fn require_str(&self, key: &str) -> Result<String, Diagnostic> {
        match self.values.get(key) {
            Some(Value::Str(value)) => Ok(value.clone()),
            _ => Err(missing(key, &self.span)),
        }
    }

    pub fn require_int(&self, key: &str) -> Result<i64, Diagnostic> {
        match self.values.get(key) {
            Some(Value::Int(value)) => Ok(*value),
            _ => Err(missing(key, &self.span)),
        }
    }
}

fn missing(key: &str, span: &SourceSpan) -> Diagnostic {
    Diagnostic::problem(
        Problem::MissingProperty,
        Label::span(span.clone(), "Property is not defined"),
    )
    .with_context("property", key)
}

/// Validates raw keyword/value pairs against a schema.
///
/// Every key in the schema is mandatory. Reports all missing keys in a
/// single diagnostic, or the first value that does not coerce to its
/// declared type, or the first key that is not part of the schema.
pub fn validate(
    raw: &HashMap<String, String>,
    schema: &[(&str, SchemaType)],
    span: &SourceSpan,
) -> Result<Validated, Diagnostic> {
    let missing_keys: Vec<&str> = schema
        .iter()
        .filter(|(key, _)| !raw.contains_key(*key))
        .map(|(key, _)| *key)
        .collect();
    if !missing_keys.is_empty() {
        let mut diagnostic = Diagnostic::problem(
            Problem::MissingProperty,
            Label::span(span.clone(), "Mandatory properties are not defined"),
        );
        for key in missing_keys {
            diagnostic = diagnostic.with_context("property", key);
        }
        return Err(diagnostic);
    }

    let mut values = HashMap::new();
    for (key, schema_type) in schema {
        // Presence was checked above so absent keys cannot occur here.
        let Some(text) = raw.get(*key) else {
            continue;
        };
        let value = match schema_type {
            SchemaType::Str => Value::Str(text.clone()),
            SchemaType::Int => {
                let parsed = text.trim().parse::<i64>().map_err(|_| {
                    Diagnostic::problem(
                        Problem::TypeMismatch,
                        Label::span(span.clone(), format!("The value '{}' is not valid", text)),
                    )
                    .with_context("property", key)
                    .with_context("expected", schema_type.name())
                })?;
                Value::Int(parsed)
            }
        };
        values.insert((*key).to_string(), value);
    }

    let mut unknown: Vec<&String> = raw
        .keys()
        .filter(|key| !schema.iter().any(|(name, _)| name == *key))
        .collect();
    unknown.sort();
    if let Some(key) = unknown.first() {
        return Err(Diagnostic::problem(
            Problem::UnknownKeyword,
            Label::span(span.clone(), "Keyword is not part of the schema"),
        )
        .with_context("keyword", key));
    }

    Ok(Validated {
        values,
        span: span.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: [(&str, SchemaType); 3] = [
        ("DEVICE", SchemaType::Str),
        ("EPICSTOPLCLENGTH", SchemaType::Int),
        ("PLCTOEPICSLENGTH", SchemaType::Int),
    ];

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn validate_when_complete_then_coerces_values() {
        let raw = raw(&[
            ("DEVICE", "Pump1"),
            ("EPICSTOPLCLENGTH", "10"),
            ("PLCTOEPICSLENGTH", "12"),
        ]);
        let validated = validate(&raw, &SCHEMA, &SourceSpan::default()).unwrap();

        assert_eq!(validated.require_str("DEVICE").unwrap(), "Pump1");
        assert_eq!(validated.require_int("EPICSTOPLCLENGTH").unwrap(), 10);
    }

    #[test]
    fn validate_when_missing_keys_then_reports_all_in_one_diagnostic() {
        let raw = raw(&[("DEVICE", "Pump1")]);
        let err = validate(&raw, &SCHEMA, &SourceSpan::default()).unwrap_err();

        assert_eq!(err.code, "I0001");
        let description = err.description();
        assert!(description.contains("property=EPICSTOPLCLENGTH"));
        assert!(description.contains("property=PLCTOEPICSLENGTH"));
    }

    #[test]
    fn validate_when_not_integer_then_type_mismatch_names_key() {
        let raw = raw(&[
            ("DEVICE", "Pump1"),
            ("EPICSTOPLCLENGTH", "ten"),
            ("PLCTOEPICSLENGTH", "12"),
        ]);
        let err = validate(&raw, &SCHEMA, &SourceSpan::default()).unwrap_err();

        assert_eq!(err.code, "I0002");
        assert!(err.description().contains("property=EPICSTOPLCLENGTH"));
        assert!(err.description().contains("expected=integer"));
    }

    #[test]
    fn validate_when_unknown_key_then_error() {
        let raw = raw(&[
            ("DEVICE", "Pump1"),
            ("EPICSTOPLCLENGTH", "10"),
            ("PLCTOEPICSLENGTH", "12"),
            ("NOT_A_KEYWORD", "1"),
        ]);
        let err = validate(&raw, &SCHEMA, &SourceSpan::default()).unwrap_err();

        assert_eq!(err.code, "I0003");
        assert!(err.description().contains("keyword=NOT_A_KEYWORD"));
    }
}
