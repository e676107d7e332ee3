//! Producer index for the closure.
//!
//! Maps each physical output commodity to the positions of the edges that
//! produce it. Sink outputs (demand, emission) are not indexed: they need no
//! onward consumer.

use std::collections::{BTreeMap, BTreeSet};

use hz_core::CommodityId;

use crate::edge::EfficiencyEdge;

/// `producers_of[commodity]` over a slice of edges.
#[derive(Debug, Clone, Default)]
pub struct ProducerIndex {
    producers: BTreeMap<CommodityId, Vec<usize>>,
}

impl ProducerIndex {
    /// Index every edge whose output is physical.
    pub fn build(edges: &[EfficiencyEdge], physical: &BTreeSet<CommodityId>) -> Self {
        let mut producers: BTreeMap<CommodityId, Vec<usize>> = BTreeMap::new();
        for (i, edge) in edges.iter().enumerate() {
            if physical.contains(&edge.output) {
                producers.entry(edge.output.clone()).or_default().push(i);
            }
        }
        Self { producers }
    }

    /// Physical commodities produced by at least one indexed edge.
    pub fn outputs(&self) -> impl Iterator<Item = &CommodityId> {
        self.producers.keys()
    }

    /// Positions of the edges producing `commodity` (empty if none).
    pub fn producers_of(&self, commodity: &CommodityId) -> &[usize] {
        self.producers
            .get(commodity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Physical outputs that no edge consumes.
    pub fn unconsumed(&self, consumed: &BTreeSet<CommodityId>) -> BTreeSet<CommodityId> {
        self.outputs()
            .filter(|c| !consumed.contains(*c))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hz_core::Label;

    #[test]
    fn sinks_are_not_indexed() {
        let physical: BTreeSet<CommodityId> = ["A", "B"].into_iter().map(Label::from).collect();
        let edges = vec![
            EfficiencyEdge::new("R1", "A", "T1", 2020, "B", 1.0, None),
            EfficiencyEdge::new("R1", "B", "T2", 2020, "DEM", 1.0, None),
            EfficiencyEdge::new("R1", "A", "T3", 2020, "B", 1.0, None),
        ];
        let index = ProducerIndex::build(&edges, &physical);
        assert_eq!(index.len(), 1);
        assert_eq!(index.producers_of(&Label::from("B")), &[0, 2]);
        assert!(index.producers_of(&Label::from("DEM")).is_empty());
    }

    #[test]
    fn unconsumed_outputs() {
        let physical: BTreeSet<CommodityId> =
            ["A", "B", "C"].into_iter().map(Label::from).collect();
        let edges = vec![
            EfficiencyEdge::new("R1", "A", "T1", 2020, "B", 1.0, None),
            EfficiencyEdge::new("R1", "B", "T2", 2020, "C", 1.0, None),
        ];
        let index = ProducerIndex::build(&edges, &physical);
        let consumed: BTreeSet<CommodityId> = edges.iter().map(|e| e.input.clone()).collect();
        let illegal = index.unconsumed(&consumed);
        assert_eq!(illegal.into_iter().collect::<Vec<_>>(), vec![Label::from("C")]);
    }
}
