//! Table-driven line parsing for hand-exported formats.
//!
//! Each line format is an ordered list of field specs: name, coercion, and
//! whether the field may be absent. Adding a format means adding a schema
//! table, not new parsing code. Hand-exported files are uneven, so a failed
//! coercion is a per-line error the decoders turn into a logged skip.

use serde_json::Value;
use thiserror::Error;
use waymark_core::Properties;

/// How a raw token becomes a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Coerce {
    /// Signed integer, e.g. a block coordinate.
    Int,
    /// Finite floating point, e.g. a colour channel or cull timer.
    Float,
    /// `true` for the literal string `"true"`, otherwise `false`. An
    /// optional Bool left out of a line also reads `false`.
    Bool,
    /// Verbatim text.
    Text,
}

/// One field in a line schema.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldSpec {
    pub(crate) name: &'static str,
    pub(crate) coerce: Coerce,
    pub(crate) required: bool,
}

impl FieldSpec {
    pub(crate) const fn required(name: &'static str, coerce: Coerce) -> Self {
        Self {
            name,
            coerce,
            required: true,
        }
    }

    pub(crate) const fn optional(name: &'static str, coerce: Coerce) -> Self {
        Self {
            name,
            coerce,
            required: false,
        }
    }
}

/// Per-line parse failure; the caller skips the line and continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LineError {
    #[error("missing field {field}")]
    Missing { field: &'static str },
    #[error("field {field} is not numeric: {value:?}")]
    Numeric {
        field: &'static str,
        value: String,
    },
}

/// Parse a `key:value` token line against a schema.
///
/// Tokens split on commas and keys from values on the first colon. Unknown
/// keys ride along as text properties; schema fields overwrite them with
/// their coerced values.
pub(crate) fn parse_keyed_line(line: &str, schema: &[FieldSpec]) -> Result<Properties, LineError> {
    let mut properties = Properties::new();
    for token in line.split(',') {
        if let Some((key, value)) = token.split_once(':') {
            properties.insert(key.to_owned(), Value::from(value));
        }
    }
    coerce_fields(&mut properties, schema)?;
    Ok(properties)
}

/// Parse a positional CSV line against a schema.
///
/// Values pair with specs in order; surplus values are ignored and a short
/// line is fine as long as the missing tail fields are optional.
pub(crate) fn parse_positional_line(
    line: &str,
    schema: &[FieldSpec],
) -> Result<Properties, LineError> {
    let mut properties = Properties::new();
    let mut values = line.split(',');
    for spec in schema {
        match values.next() {
            Some(raw) => {
                let coerced = coerce_value(spec, raw)?;
                properties.insert(spec.name.to_owned(), coerced);
            }
            None if spec.required => return Err(LineError::Missing { field: spec.name }),
            None => {
                if let Some(default) = absent_default(spec) {
                    properties.insert(spec.name.to_owned(), default);
                }
            }
        }
    }
    Ok(properties)
}

/// Integer property previously coerced by a schema.
pub(crate) fn int_field(properties: &Properties, field: &'static str) -> Result<i64, LineError> {
    properties
        .get(field)
        .and_then(Value::as_i64)
        .ok_or(LineError::Missing { field })
}

/// Float property previously coerced by a schema.
pub(crate) fn float_field(properties: &Properties, field: &'static str) -> Result<f64, LineError> {
    properties
        .get(field)
        .and_then(Value::as_f64)
        .ok_or(LineError::Missing { field })
}

/// Text property previously coerced by a schema.
pub(crate) fn text_field<'a>(
    properties: &'a Properties,
    field: &'static str,
) -> Result<&'a str, LineError> {
    properties
        .get(field)
        .and_then(Value::as_str)
        .ok_or(LineError::Missing { field })
}

fn coerce_fields(properties: &mut Properties, schema: &[FieldSpec]) -> Result<(), LineError> {
    for spec in schema {
        let raw = match properties.get(spec.name) {
            Some(Value::String(raw)) => raw.clone(),
            _ if spec.required => return Err(LineError::Missing { field: spec.name }),
            _ => {
                if let Some(default) = absent_default(spec) {
                    properties.insert(spec.name.to_owned(), default);
                }
                continue;
            }
        };
        let coerced = coerce_value(spec, &raw)?;
        properties.insert(spec.name.to_owned(), coerced);
    }
    Ok(())
}

/// Value an absent optional field settles on, where the coercion has one.
///
/// Only Bool does: a toggle that was never written is off, so the property
/// is materialised as `false` rather than left out.
fn absent_default(spec: &FieldSpec) -> Option<Value> {
    match spec.coerce {
        Coerce::Bool => Some(Value::Bool(false)),
        Coerce::Int | Coerce::Float | Coerce::Text => None,
    }
}

fn coerce_value(spec: &FieldSpec, raw: &str) -> Result<Value, LineError> {
    let numeric_error = || LineError::Numeric {
        field: spec.name,
        value: raw.to_owned(),
    };
    match spec.coerce {
        Coerce::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| numeric_error()),
        Coerce::Float => {
            let value = raw.trim().parse::<f64>().map_err(|_| numeric_error())?;
            if value.is_finite() {
                Ok(Value::from(value))
            } else {
                Err(numeric_error())
            }
        }
        Coerce::Bool => Ok(Value::Bool(raw == "true")),
        Coerce::Text => Ok(Value::from(raw)),
    }
}
