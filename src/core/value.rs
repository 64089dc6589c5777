// Copyright 2026 FedSQL Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Value type for FedSQL - runtime values with type information
//!
//! This module provides a unified Value enum that represents SQL values
//! with full type information, coercion accessors, comparison, and the
//! arithmetic used by the procedural expression evaluator.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::error::{Error, Result};
use super::types::DataType;

/// A runtime value with type information
///
/// Each variant carries its data directly. Text uses Arc<str> for cheap
/// cloning during row operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value with optional type hint
    Null(DataType),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    /// UTF-8 text string (Arc for cheap cloning)
    Text(Arc<str>),

    /// Boolean value
    Boolean(bool),

    /// Timestamp (UTC)
    Timestamp(DateTime<Utc>),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a NULL value with a type hint
    pub fn null(data_type: DataType) -> Self {
        Value::Null(data_type)
    }

    /// Create a NULL value with unknown type
    pub fn null_unknown() -> Self {
        Value::Null(DataType::Null)
    }

    /// Create an integer value
    pub fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    /// Create a float value
    pub fn float(value: f64) -> Self {
        Value::Float(value)
    }

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Arc::from(value.into().as_str()))
    }

    /// Create a boolean value
    pub fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    /// Create a timestamp value
    pub fn timestamp(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }

    // =========================================================================
    // Type accessors
    // =========================================================================

    /// Returns the data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null(dt) => *dt,
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::Text(_) => DataType::Text,
            Value::Boolean(_) => DataType::Boolean,
            Value::Timestamp(_) => DataType::Timestamp,
        }
    }

    /// Returns true if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    // =========================================================================
    // Value extractors
    // =========================================================================

    /// Extract as i64, with type coercion
    ///
    /// Returns None if the value is NULL or conversion is not possible.
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Null(_) => None,
            Value::Integer(v) => Some(*v),
            Value::Float(v) => Some(*v as i64),
            Value::Text(s) => s.parse::<i64>().ok(),
            Value::Boolean(b) => Some(if *b { 1 } else { 0 }),
            Value::Timestamp(t) => Some(t.timestamp()),
        }
    }

    /// Extract as f64, with type coercion
    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Value::Null(_) => None,
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(s) => s.parse::<f64>().ok(),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Timestamp(_) => None,
        }
    }

    /// Extract as boolean, with type coercion
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Null(_) => None,
            Value::Integer(v) => Some(*v != 0),
            Value::Float(v) => Some(*v != 0.0),
            Value::Text(s) => {
                let s_ref: &str = s.as_ref();
                if s_ref.eq_ignore_ascii_case("true") || s_ref == "1" {
                    Some(true)
                } else if s_ref.eq_ignore_ascii_case("false") || s_ref == "0" {
                    Some(false)
                } else {
                    None
                }
            }
            Value::Boolean(b) => Some(*b),
            Value::Timestamp(_) => None,
        }
    }

    /// Extract as String, with type coercion
    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::Null(_) => None,
            _ => Some(self.to_string()),
        }
    }

    /// Extract as string reference (avoids clone for Text)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Compare two values for ordering
    ///
    /// NULLs compare equal to each other; comparing NULL with a non-NULL
    /// value is an error (SQL three-valued logic is handled by the
    /// expression evaluator, which never reaches this path with one NULL).
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        if self.is_null() || other.is_null() {
            if self.is_null() && other.is_null() {
                return Ok(Ordering::Equal);
            }
            return Err(Error::NullComparison);
        }

        // Same type comparison (most efficient path)
        if self.data_type() == other.data_type() {
            return self.compare_same_type(other);
        }

        // Cross-type numeric comparison (integer vs float)
        if self.data_type().is_numeric() && other.data_type().is_numeric() {
            let v1 = self.as_float64().unwrap_or(0.0);
            let v2 = other.as_float64().unwrap_or(0.0);
            return Ok(compare_floats(v1, v2));
        }

        Err(Error::IncomparableTypes)
    }

    /// Compare values of the same type
    fn compare_same_type(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => Ok(compare_floats(*a, *b)),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Ok(a.cmp(b)),
            _ => Err(Error::IncomparableTypes),
        }
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    /// Add two values with numeric promotion; NULL propagates
    pub fn add(&self, other: &Value) -> Result<Value> {
        if self.is_null() || other.is_null() {
            return Ok(Value::null(promote(self, other)));
        }
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a
                .checked_add(*b)
                .map(Value::Integer)
                .ok_or_else(|| Error::expression("integer overflow in addition")),
            _ => self.float_pair(other, "add").map(|(a, b)| Value::Float(a + b)),
        }
    }

    /// Subtract two values with numeric promotion; NULL propagates
    pub fn subtract(&self, other: &Value) -> Result<Value> {
        if self.is_null() || other.is_null() {
            return Ok(Value::null(promote(self, other)));
        }
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a
                .checked_sub(*b)
                .map(Value::Integer)
                .ok_or_else(|| Error::expression("integer overflow in subtraction")),
            _ => self
                .float_pair(other, "subtract")
                .map(|(a, b)| Value::Float(a - b)),
        }
    }

    /// Multiply two values with numeric promotion; NULL propagates
    pub fn multiply(&self, other: &Value) -> Result<Value> {
        if self.is_null() || other.is_null() {
            return Ok(Value::null(promote(self, other)));
        }
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a
                .checked_mul(*b)
                .map(Value::Integer)
                .ok_or_else(|| Error::expression("integer overflow in multiplication")),
            _ => self
                .float_pair(other, "multiply")
                .map(|(a, b)| Value::Float(a * b)),
        }
    }

    /// Divide two values with numeric promotion; NULL propagates
    pub fn divide(&self, other: &Value) -> Result<Value> {
        if self.is_null() || other.is_null() {
            return Ok(Value::null(promote(self, other)));
        }
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => {
                if *b == 0 {
                    Err(Error::DivisionByZero)
                } else {
                    Ok(Value::Integer(a / b))
                }
            }
            _ => {
                let (a, b) = self.float_pair(other, "divide")?;
                if b == 0.0 {
                    Err(Error::DivisionByZero)
                } else {
                    Ok(Value::Float(a / b))
                }
            }
        }
    }

    fn float_pair(&self, other: &Value, verb: &str) -> Result<(f64, f64)> {
        match (self.as_float64(), other.as_float64()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(Error::expression(format!(
                "cannot {} {} and {}",
                verb,
                self.data_type(),
                other.data_type()
            ))),
        }
    }
}

/// Numeric type promotion for NULL propagation in arithmetic
fn promote(a: &Value, b: &Value) -> DataType {
    if a.data_type() == DataType::Float || b.data_type() == DataType::Float {
        DataType::Float
    } else {
        DataType::Integer
    }
}

/// Total ordering over floats: NaN sorts last
fn compare_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| {
        if a.is_nan() && b.is_nan() {
            Ordering::Equal
        } else if a.is_nan() {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null(_) => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => {
                if v.is_finite() && *v == v.trunc() {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type() {
        assert_eq!(Value::integer(1).data_type(), DataType::Integer);
        assert_eq!(Value::text("a").data_type(), DataType::Text);
        assert_eq!(Value::null(DataType::Float).data_type(), DataType::Float);
        assert!(Value::null_unknown().is_null());
        assert!(!Value::boolean(false).is_null());
    }

    #[test]
    fn test_coercion() {
        assert_eq!(Value::text("42").as_int64(), Some(42));
        assert_eq!(Value::integer(3).as_float64(), Some(3.0));
        assert_eq!(Value::boolean(true).as_int64(), Some(1));
        assert_eq!(Value::text("true").as_boolean(), Some(true));
        assert_eq!(Value::text("0").as_boolean(), Some(false));
        assert_eq!(Value::text("maybe").as_boolean(), None);
        assert_eq!(Value::null_unknown().as_int64(), None);
    }

    #[test]
    fn test_compare() {
        assert_eq!(
            Value::integer(1).compare(&Value::integer(2)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::integer(2).compare(&Value::float(2.0)).unwrap(),
            Ordering::Equal
        );
        assert_eq!(
            Value::text("b").compare(&Value::text("a")).unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            Value::null_unknown().compare(&Value::null_unknown()).unwrap(),
            Ordering::Equal
        );
        assert_eq!(
            Value::null_unknown().compare(&Value::integer(1)),
            Err(Error::NullComparison)
        );
        assert_eq!(
            Value::text("a").compare(&Value::integer(1)),
            Err(Error::IncomparableTypes)
        );
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            Value::integer(2).add(&Value::integer(3)).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(
            Value::integer(2).add(&Value::float(0.5)).unwrap(),
            Value::Float(2.5)
        );
        assert_eq!(
            Value::integer(7).divide(&Value::integer(2)).unwrap(),
            Value::Integer(3)
        );
        assert_eq!(
            Value::integer(1).divide(&Value::integer(0)),
            Err(Error::DivisionByZero)
        );
        assert_eq!(
            Value::float(1.0).divide(&Value::float(0.0)),
            Err(Error::DivisionByZero)
        );
    }

    #[test]
    fn test_arithmetic_null_propagation() {
        let result = Value::null_unknown().add(&Value::integer(1)).unwrap();
        assert!(result.is_null());
        assert_eq!(result.data_type(), DataType::Integer);

        let result = Value::float(1.0).multiply(&Value::null_unknown()).unwrap();
        assert!(result.is_null());
        assert_eq!(result.data_type(), DataType::Float);
    }

    #[test]
    fn test_integer_overflow() {
        assert!(Value::integer(i64::MAX).add(&Value::integer(1)).is_err());
        assert!(Value::integer(i64::MIN)
            .subtract(&Value::integer(1))
            .is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::integer(7).to_string(), "7");
        assert_eq!(Value::float(2.0).to_string(), "2.0");
        assert_eq!(Value::float(2.5).to_string(), "2.5");
        assert_eq!(Value::text("hi").to_string(), "hi");
        assert_eq!(Value::null_unknown().to_string(), "NULL");
        assert_eq!(Value::boolean(true).to_string(), "true");
    }
}
