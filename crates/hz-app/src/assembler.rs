//! Aggregates projections into the bundle handed to model construction.

use hz_projection::ParameterProjection;
use indexmap::IndexMap;
use serde::Serialize;

/// Every projected parameter and set under a single namespace.
///
/// The default namespace is `None`. Insertion order follows the registry and
/// only matters for readability of dumps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataBundle {
    pub namespace: Option<String>,
    pub data: IndexMap<String, ParameterProjection>,
}

impl DataBundle {
    pub fn get(&self, name: &str) -> Option<&ParameterProjection> {
        self.data.get(name)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}

/// Collect projections into a bundle. No filtering happens here; a repeated
/// name keeps its first position and takes the later value.
pub fn assemble<N, I>(projections: I) -> DataBundle
where
    N: Into<String>,
    I: IntoIterator<Item = (N, ParameterProjection)>,
{
    DataBundle {
        namespace: None,
        data: projections
            .into_iter()
            .map(|(name, projection)| (name.into(), projection))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hz_core::Value;

    #[test]
    fn bundle_json_shape() {
        let mut cost = IndexMap::new();
        cost.insert(
            vec![Value::from("R1"), Value::from("T1"), Value::from(2020)],
            Value::real(100.0),
        );
        let bundle = assemble([
            ("regions", ParameterProjection::Set(vec![Value::from("R1")])),
            ("CostInvest", ParameterProjection::Param(cost)),
        ]);
        assert_eq!(bundle.names().collect::<Vec<_>>(), vec!["regions", "CostInvest"]);
        assert_eq!(
            serde_json::to_string(&bundle).unwrap(),
            r#"{"namespace":null,"data":{"regions":["R1"],"CostInvest":[[["R1","T1",2020],100.0]]}}"#
        );
    }

    #[test]
    fn empty_input_gives_empty_bundle() {
        let bundle = assemble(Vec::<(String, ParameterProjection)>::new());
        assert!(bundle.is_empty());
        assert!(bundle.namespace.is_none());
    }
}
