//! Typed row predicates.

use core::cmp::Ordering;
use hz_core::Value;

/// Filter applied by a select. Column names are validated by the adapter and
/// values are always bound as parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(String, Value),
    /// Text column starts with the given prefix (SQL `LIKE 'prefix%'`).
    StartsWith(String, String),
    Lt(String, Value),
    Le(String, Value),
    Gt(String, Value),
    Ge(String, Value),
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Predicate::Eq(column.to_string(), value.into())
    }

    pub fn starts_with(column: &str, prefix: &str) -> Self {
        Predicate::StartsWith(column.to_string(), prefix.to_string())
    }

    pub fn lt(column: &str, value: impl Into<Value>) -> Self {
        Predicate::Lt(column.to_string(), value.into())
    }

    pub fn le(column: &str, value: impl Into<Value>) -> Self {
        Predicate::Le(column.to_string(), value.into())
    }

    pub fn gt(column: &str, value: impl Into<Value>) -> Self {
        Predicate::Gt(column.to_string(), value.into())
    }

    pub fn ge(column: &str, value: impl Into<Value>) -> Self {
        Predicate::Ge(column.to_string(), value.into())
    }

    /// Inclusive range on one column.
    pub fn between(column: &str, lo: impl Into<Value>, hi: impl Into<Value>) -> Self {
        Predicate::And(vec![Self::ge(column, lo), Self::le(column, hi)])
    }

    /// Conjunction, flattening nested `And`s and dropping `None`s.
    pub fn all(parts: impl IntoIterator<Item = Option<Predicate>>) -> Option<Predicate> {
        let mut flat = Vec::new();
        for part in parts.into_iter().flatten() {
            match part {
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(Predicate::And(flat)),
        }
    }

    /// Every column the predicate reads.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Predicate::Eq(c, _)
            | Predicate::StartsWith(c, _)
            | Predicate::Lt(c, _)
            | Predicate::Le(c, _)
            | Predicate::Gt(c, _)
            | Predicate::Ge(c, _) => vec![c.as_str()],
            Predicate::And(parts) => parts.iter().flat_map(|p| p.columns()).collect(),
        }
    }

    /// Evaluate against a row, resolving columns through `lookup`.
    ///
    /// Comparisons with Null or mismatched kinds are false, as in SQL.
    pub fn matches<'a>(&self, lookup: &impl Fn(&str) -> Option<&'a Value>) -> bool {
        let cmp = |c: &str, v: &Value| lookup(c).and_then(|cell| cell.compare(v));
        match self {
            Predicate::Eq(c, v) => cmp(c, v) == Some(Ordering::Equal),
            Predicate::StartsWith(c, prefix) => lookup(c)
                .and_then(Value::as_text)
                .is_some_and(|s| s.starts_with(prefix.as_str())),
            Predicate::Lt(c, v) => cmp(c, v) == Some(Ordering::Less),
            Predicate::Le(c, v) => matches!(cmp(c, v), Some(Ordering::Less | Ordering::Equal)),
            Predicate::Gt(c, v) => cmp(c, v) == Some(Ordering::Greater),
            Predicate::Ge(c, v) => {
                matches!(cmp(c, v), Some(Ordering::Greater | Ordering::Equal))
            }
            Predicate::And(parts) => parts.iter().all(|p| p.matches(lookup)),
        }
    }
}
