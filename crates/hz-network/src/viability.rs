//! The closure's output: an immutable, per-window viability set.

use std::collections::BTreeSet;

use hz_core::{CommodityId, TechId, Year};

use crate::edge::{EfficiencyEdge, Process};

/// One suppression round of the closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionRound {
    /// Physical outputs with no consumer at the start of the round.
    pub illegal_outputs: BTreeSet<CommodityId>,
    /// Edges removed in this round, sorted.
    pub suppressed: Vec<EfficiencyEdge>,
    /// Retained edge count after the round.
    pub retained_after: usize,
}

/// Technologies, commodities and processes forming a self-consistent,
/// reachable production network within one window.
///
/// Built fresh per window and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViabilitySet {
    pub(crate) technologies: BTreeSet<TechId>,
    pub(crate) input_commodities: BTreeSet<CommodityId>,
    pub(crate) output_commodities: BTreeSet<CommodityId>,
    pub(crate) commodities: BTreeSet<CommodityId>,
    pub(crate) processes: BTreeSet<Process>,
    pub(crate) vintages: BTreeSet<Year>,

    /// Retained edges, sorted and distinct.
    pub(crate) edges: Vec<EfficiencyEdge>,

    /// Every suppressed edge, sorted.
    pub(crate) suppressed: Vec<EfficiencyEdge>,

    pub(crate) rounds: Vec<SuppressionRound>,

    /// Distinct edges the closure started from.
    pub(crate) initial_edges: usize,
}

impl ViabilitySet {
    /// Derive every viable set from the retained edges.
    pub(crate) fn from_retained(
        edges: Vec<EfficiencyEdge>,
        mut suppressed: Vec<EfficiencyEdge>,
        rounds: Vec<SuppressionRound>,
        initial_edges: usize,
    ) -> Self {
        let mut set = Self {
            initial_edges,
            rounds,
            ..Self::default()
        };
        for edge in &edges {
            set.technologies.insert(edge.tech.clone());
            set.input_commodities.insert(edge.input.clone());
            set.output_commodities.insert(edge.output.clone());
            set.processes.insert(edge.process());
            set.vintages.insert(edge.vintage);
        }
        set.commodities = set
            .input_commodities
            .union(&set.output_commodities)
            .cloned()
            .collect();
        suppressed.sort();
        set.suppressed = suppressed;
        set.edges = edges;
        set
    }

    pub fn technologies(&self) -> &BTreeSet<TechId> {
        &self.technologies
    }

    pub fn input_commodities(&self) -> &BTreeSet<CommodityId> {
        &self.input_commodities
    }

    pub fn output_commodities(&self) -> &BTreeSet<CommodityId> {
        &self.output_commodities
    }

    /// Union of viable input and output commodities.
    pub fn commodities(&self) -> &BTreeSet<CommodityId> {
        &self.commodities
    }

    pub fn processes(&self) -> &BTreeSet<Process> {
        &self.processes
    }

    pub fn vintages(&self) -> &BTreeSet<Year> {
        &self.vintages
    }

    /// The canonical edge list, sorted.
    pub fn edges(&self) -> &[EfficiencyEdge] {
        &self.edges
    }

    pub fn suppressed(&self) -> &[EfficiencyEdge] {
        &self.suppressed
    }

    pub fn rounds(&self) -> &[SuppressionRound] {
        &self.rounds
    }

    pub fn initial_edge_count(&self) -> usize {
        self.initial_edges
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains_process(&self, region: &str, tech: &str, vintage: Year) -> bool {
        self.processes
            .contains(&Process::new(region, tech, vintage))
    }

    /// Retained edges whose physical output nothing retained consumes.
    ///
    /// Always empty for a set produced by the closure.
    pub fn dead_ends(&self, physical: &BTreeSet<CommodityId>) -> Vec<&EfficiencyEdge> {
        self.edges
            .iter()
            .filter(|e| physical.contains(&e.output) && !self.input_commodities.contains(&e.output))
            .collect()
    }
}
