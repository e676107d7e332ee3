//! The projected artifact handed to the assembler.

use hz_core::{Key, Value};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A validated parameter or set.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterProjection {
    /// Distinct membership values.
    Set(Vec<Value>),
    /// Key tuple to scalar value, in first-seen key order.
    Param(IndexMap<Key, Value>),
}

impl ParameterProjection {
    pub fn len(&self) -> usize {
        match self {
            ParameterProjection::Set(values) => values.len(),
            ParameterProjection::Param(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_set(&self) -> Option<&[Value]> {
        match self {
            ParameterProjection::Set(values) => Some(values),
            ParameterProjection::Param(_) => None,
        }
    }

    pub fn as_param(&self) -> Option<&IndexMap<Key, Value>> {
        match self {
            ParameterProjection::Param(map) => Some(map),
            ParameterProjection::Set(_) => None,
        }
    }
}

/// Sets serialize as a list of scalars, params as a list of `[key, value]`
/// pairs since JSON object keys cannot be tuples.
impl Serialize for ParameterProjection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParameterProjection::Set(values) => serializer.collect_seq(values),
            ParameterProjection::Param(map) => {
                let mut seq = serializer.serialize_seq(Some(map.len()))?;
                for entry in map {
                    seq.serialize_element(&entry)?;
                }
                seq.end()
            }
        }
    }
}
