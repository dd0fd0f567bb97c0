// ============================================================================
// Weak casting between storage values and a field's declared type
// ============================================================================
//
// Casting never fails. Malformed input collapses to the nearest value the
// target type can hold (a non-numeric string becomes 0), mirroring the loose
// typing of the storage layer. Callers that need strict validation must do
// it before assignment. NULL is kept as NULL for every type.

use crate::core::{Row, Value};
use crate::schema::FieldSpec;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INT_PREFIX: Regex = Regex::new(r"^\s*[+-]?\d+").expect("static regex");
    static ref FLOAT_PREFIX: Regex =
        Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").expect("static regex");
}

/// Target representation derived from a field's type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    Boolean,
    Text,
    Integer,
    Float,
    Passthrough,
}

impl CastKind {
    /// Classifies a SQL type tag. Checked in order: boolean, varchar, integer,
    /// fractional; anything else (fixed CHAR, TEXT, dates, enums, blobs) passes
    /// through.
    pub fn from_type_tag(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_uppercase();
        if tag == "BOOLEAN" || tag == "BOOL" || tag == "TINYINT(1)" {
            Self::Boolean
        } else if tag.contains("VARCHAR") {
            Self::Text
        } else if tag.contains("INT") {
            Self::Integer
        } else if tag.contains("DECIMAL") || tag.contains("FLOAT") || tag.contains("DOUBLE") {
            Self::Float
        } else {
            Self::Passthrough
        }
    }

    pub fn cast(&self, value: Value) -> Value {
        if value.is_null() {
            return value;
        }
        match self {
            Self::Boolean => Value::Boolean(value.as_bool()),
            Self::Text => Value::Text(to_text(value)),
            Self::Integer => Value::Integer(to_integer(&value)),
            Self::Float => Value::Float(to_float(&value)),
            Self::Passthrough => value,
        }
    }
}

/// Casts `value` to the type declared by `spec`.
pub fn cast_field(spec: &FieldSpec, value: Value) -> Value {
    CastKind::from_type_tag(spec.type_tag()).cast(value)
}

/// Casts every declared field present in `row`; other columns are left alone.
pub fn datacast(mut row: Row, fields: &IndexMap<String, FieldSpec>) -> Row {
    for (name, spec) in fields {
        if let Some(slot) = row.get_mut(name) {
            let value = std::mem::replace(slot, Value::Null);
            *slot = cast_field(spec, value);
        }
    }
    row
}

fn to_text(value: Value) -> String {
    match value {
        Value::Text(s) => s,
        Value::Boolean(b) => if b { "1" } else { "0" }.to_string(),
        other => other.to_string(),
    }
}

fn to_integer(value: &Value) -> i64 {
    match value {
        Value::Integer(i) => *i,
        // `as` saturates out-of-range floats and maps NaN to 0.
        Value::Float(f) => *f as i64,
        Value::Boolean(b) => *b as i64,
        Value::Text(s) => parse_int_prefix(s),
        Value::List(items) => items.len().min(1) as i64,
        Value::Null => 0,
    }
}

fn to_float(value: &Value) -> f64 {
    match value {
        Value::Float(f) => *f,
        Value::Integer(i) => *i as f64,
        Value::Boolean(b) => if *b { 1.0 } else { 0.0 },
        Value::Text(s) => FLOAT_PREFIX
            .find(s)
            .and_then(|m| m.as_str().trim().parse::<f64>().ok())
            .unwrap_or(0.0),
        Value::List(items) => items.len().min(1) as f64,
        Value::Null => 0.0,
    }
}

fn parse_int_prefix(s: &str) -> i64 {
    let Some(m) = INT_PREFIX.find(s) else {
        return 0;
    };
    let digits = m.as_str().trim();
    digits.parse::<i64>().unwrap_or_else(|_| {
        if digits.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}
