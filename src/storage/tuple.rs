//! Row and Value types for Tabula
//!
//! This module defines how data values are represented in memory and how raw
//! statement literals are coerced into them by column type.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::DataType;

/// Format used for `CURRENT_TIMESTAMP` and normalised DATETIME/TIMESTAMP values.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A value in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value (64-bit)
    Integer(i64),
    /// Float value (64-bit)
    Float(f64),
    /// String value (also holds temporal values in their ISO text form)
    String(String),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric reading of the value. Strings count when they parse as a
    /// finite number; booleans and NULL never do.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => parse_number(s),
            Value::Boolean(_) | Value::Null => None,
        }
    }

    /// String form used by comparisons and LIKE. NULL has none.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Rough in-memory footprint in bytes.
    pub fn size_hint(&self) -> usize {
        match self {
            Value::Null => 1,
            Value::Boolean(_) => 1,
            Value::Integer(_) | Value::Float(_) => 8,
            Value::String(s) => s.len(),
        }
    }

    /// Coerce a de-quoted literal according to the target column type.
    ///
    /// Integers fall back to 0 and fractional numbers to 0.0 when the literal
    /// does not parse; booleans are true only for `true` or `1`.
    pub fn coerce(raw: &str, data_type: DataType) -> Value {
        let trimmed = raw.trim();
        match data_type {
            DataType::Int | DataType::BigInt | DataType::Year => {
                Value::Integer(parse_integer(trimmed).unwrap_or(0))
            }
            DataType::Decimal | DataType::Float | DataType::Double => {
                Value::Float(parse_number(trimmed).unwrap_or(0.0))
            }
            DataType::Boolean => {
                Value::Boolean(trimmed.eq_ignore_ascii_case("true") || trimmed == "1")
            }
            DataType::Date => Value::String(normalize_date(raw)),
            DataType::DateTime | DataType::Timestamp => Value::String(normalize_datetime(raw)),
            _ => Value::String(raw.to_string()),
        }
    }

    /// Value used to back-fill a NOT NULL column that has no default.
    pub fn zero(data_type: DataType) -> Value {
        if data_type.is_integer() || data_type == DataType::Year {
            Value::Integer(0)
        } else if data_type.is_fractional() {
            Value::Float(0.0)
        } else {
            Value::String(String::new())
        }
    }

    /// The current UTC time as a `CURRENT_TIMESTAMP` value.
    pub fn current_timestamp() -> Value {
        Value::String(Utc::now().format(TIMESTAMP_FORMAT).to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_integer(s: &str) -> Option<i64> {
    s.parse::<i64>()
        .ok()
        .or_else(|| parse_number(s).map(|n| n.trunc() as i64))
}

fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    match parse_datetime(trimmed) {
        Some(dt) => dt.date().format("%Y-%m-%d").to_string(),
        None => raw.to_string(),
    }
}

fn normalize_datetime(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(dt) = parse_datetime(trimmed) {
        return dt.format(TIMESTAMP_FORMAT).to_string();
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => format!("{} 00:00:00", date.format("%Y-%m-%d")),
        Err(_) => raw.to_string(),
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// A table row: one value per declared column, in declaration order.
///
/// Rows are only built through `Table`, which checks the arity against its
/// column list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Get all values
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Get a value by column index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub(crate) fn set(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
