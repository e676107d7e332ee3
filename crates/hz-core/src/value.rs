//! Scalar cells read from the relational store.

use core::cmp::Ordering;
use core::fmt;
use ordered_float::OrderedFloat;

use crate::ids::{Label, Year};

/// One cell of a store row.
///
/// Totally ordered and hashable so that tuples of values can key a parameter
/// mapping. The derived order groups by variant first (Null < Integer < Real < Text);
/// use [`Value::compare`] for numeric comparisons that cross Integer/Real.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Null,
    Integer(i64),
    Real(OrderedFloat<f64>),
    Text(String),
}

/// A fixed-arity tuple as returned by a select.
pub type Row = Vec<Value>;

/// Composite key of a parameter entry (all columns but the last).
pub type Key = Vec<Value>;

impl Value {
    pub fn real(v: f64) -> Self {
        Value::Real(OrderedFloat(v))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(r) if r.fract() == 0.0 => Some(r.0 as i64),
            _ => None,
        }
    }

    /// Interpret the cell as a period/vintage.
    pub fn as_year(&self) -> Option<Year> {
        self.as_i64().and_then(|i| Year::try_from(i).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(r.0),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<Label> {
        self.as_text().map(Label::from)
    }

    /// Compare two cells the way a SQL predicate would.
    ///
    /// Numbers compare numerically across Integer/Real, text compares lexically,
    /// anything involving Null or mixed kinds is incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Text(_), _) | (_, Value::Text(_)) => None,
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r.0),
            Value::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r.0),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&Label> for Value {
    fn from(v: &Label) -> Self {
        Value::Text(v.as_str().to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(r) => serializer.serialize_f64(r.0),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}
