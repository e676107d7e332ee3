//! The viability closure.
//!
//! A fixed-point reduction over the alive edges of one window, modelled as a
//! small state machine:
//!
//! - `Scanning`: index producers of physical outputs over the retained edges,
//!   collect the outputs no retained edge consumes and mark their producers.
//! - `Suppressing`: remove the marked edges.
//! - `Stable`: nothing left to remove.
//!
//! Termination: each illegal output is, by construction, produced by at least
//! one retained edge, so every `Suppressing` step strictly shrinks the finite
//! retained set. The machine reaches `Stable` after at most `|edges|` rounds;
//! the worst case is an empty network.

use std::collections::BTreeSet;

use hz_core::{CommodityId, HzResult};
use tracing::{debug, info, warn};

use crate::edge::EfficiencyEdge;
use crate::indexing::ProducerIndex;
use crate::validate;
use crate::viability::{SuppressionRound, ViabilitySet};

/// Closure state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosureState {
    Scanning,
    Suppressing {
        illegal: BTreeSet<CommodityId>,
        /// Positions in the retained list of the edges producing `illegal`.
        doomed: BTreeSet<usize>,
    },
    Stable,
}

/// Computes the viability set of a window from its alive edges.
#[derive(Debug, Clone)]
pub struct ViabilityEngine {
    physical: BTreeSet<CommodityId>,
}

impl ViabilityEngine {
    pub fn new(physical: BTreeSet<CommodityId>) -> Self {
        Self { physical }
    }

    pub fn physical_commodities(&self) -> &BTreeSet<CommodityId> {
        &self.physical
    }

    /// Run the closure over the alive edges.
    ///
    /// Input order does not matter: edges with the same flow collapse into one
    /// (keeping the longest lifetime) and the canonical edge list is sorted.
    pub fn close(&self, edges: Vec<EfficiencyEdge>) -> HzResult<ViabilitySet> {
        if edges.is_empty() {
            warn!("no alive efficiency edges; viability sets are empty");
            return Ok(ViabilitySet::default());
        }
        validate::validate_physical_set(&self.physical)?;
        validate::validate_inputs(&edges, &self.physical)?;

        let mut retained = edges;
        retained.sort();
        // same-flow edges are adjacent after the sort
        retained.dedup_by(|later, kept| {
            if later.same_flow(kept) {
                kept.lifetime = kept.lifetime.max(later.lifetime);
                true
            } else {
                false
            }
        });
        let initial = retained.len();

        let mut rounds: Vec<SuppressionRound> = Vec::new();
        let mut suppressed: Vec<EfficiencyEdge> = Vec::new();
        let mut state = ClosureState::Scanning;

        loop {
            state = match state {
                ClosureState::Scanning => {
                    let index = ProducerIndex::build(&retained, &self.physical);
                    let consumed: BTreeSet<CommodityId> =
                        retained.iter().map(|e| e.input.clone()).collect();
                    let illegal = index.unconsumed(&consumed);
                    if illegal.is_empty() {
                        ClosureState::Stable
                    } else {
                        let doomed = illegal
                            .iter()
                            .flat_map(|c| index.producers_of(c).iter().copied())
                            .collect();
                        ClosureState::Suppressing { illegal, doomed }
                    }
                }
                ClosureState::Suppressing { illegal, doomed } => {
                    debug_assert!(!doomed.is_empty(), "suppression must remove an edge");

                    let mut kept = Vec::with_capacity(retained.len() - doomed.len());
                    let mut removed = Vec::with_capacity(doomed.len());
                    for (i, edge) in retained.into_iter().enumerate() {
                        if doomed.contains(&i) {
                            removed.push(edge);
                        } else {
                            kept.push(edge);
                        }
                    }
                    retained = kept;

                    debug!(
                        round = rounds.len() + 1,
                        illegal = illegal.len(),
                        removed = removed.len(),
                        retained = retained.len(),
                        "suppression round"
                    );
                    suppressed.extend(removed.iter().cloned());
                    rounds.push(SuppressionRound {
                        illegal_outputs: illegal,
                        suppressed: removed,
                        retained_after: retained.len(),
                    });
                    ClosureState::Scanning
                }
                ClosureState::Stable => break,
            };
        }

        let viable = ViabilitySet::from_retained(retained, suppressed, rounds, initial);

        for edge in viable.suppressed() {
            info!(
                tech = %edge.tech,
                edge = %edge,
                "tech suppressed: physical output has no viable receiver"
            );
        }
        debug!(
            from = initial,
            to = viable.edges().len(),
            "reduced efficiency edges"
        );
        debug!(
            from = self.physical.len(),
            to = viable.input_commodities().len(),
            "reduced physical commodities"
        );
        if viable.is_empty() {
            warn!(
                initial,
                "closure suppressed every edge; downstream sets will be vacuous"
            );
        }

        Ok(viable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hz_core::{HzError, Label};

    fn labels(names: &[&str]) -> BTreeSet<CommodityId> {
        names.iter().copied().map(Label::from).collect()
    }

    fn edge(input: &str, tech: &str, output: &str) -> EfficiencyEdge {
        EfficiencyEdge::new("R1", input, tech, 2020, output, 0.5, Some(30))
    }

    #[test]
    fn chain_into_sink_is_retained() {
        let engine = ViabilityEngine::new(labels(&["A", "B"]));
        let viable = engine
            .close(vec![edge("A", "T1", "B"), edge("B", "T2", "C")])
            .unwrap();
        assert_eq!(viable.edges().len(), 2);
        assert!(viable.suppressed().is_empty());
        assert!(viable.rounds().is_empty());
        assert!(viable.commodities().contains("C"));
    }

    #[test]
    fn dangling_branch_is_suppressed_without_touching_upstream() {
        // B feeds both T2 (to a sink) and T3 (to an unconsumed physical D)
        let engine = ViabilityEngine::new(labels(&["A", "B", "D"]));
        let viable = engine
            .close(vec![
                edge("A", "T1", "B"),
                edge("B", "T2", "C"),
                edge("B", "T3", "D"),
            ])
            .unwrap();
        let techs: Vec<&str> = viable.technologies().iter().map(Label::as_str).collect();
        assert_eq!(techs, vec!["T1", "T2"]);
        assert!(!viable.output_commodities().contains("D"));
        assert_eq!(viable.suppressed(), &[edge("B", "T3", "D")]);
        assert_eq!(viable.rounds().len(), 1);
    }

    #[test]
    fn suppression_cascades_upstream() {
        // C is physical with no consumer: T2 goes, then B loses its consumer, then T1
        let engine = ViabilityEngine::new(labels(&["A", "B", "C"]));
        let viable = engine
            .close(vec![edge("A", "T1", "B"), edge("B", "T2", "C")])
            .unwrap();
        assert!(viable.is_empty());
        assert_eq!(viable.rounds().len(), 2);
        assert_eq!(viable.suppressed().len(), 2);
        assert_eq!(viable.rounds()[0].retained_after, 1);
        assert_eq!(viable.rounds()[1].retained_after, 0);
    }

    #[test]
    fn duplicates_collapse() {
        let engine = ViabilityEngine::new(labels(&["A"]));
        let viable = engine
            .close(vec![edge("A", "T1", "X"), edge("A", "T1", "X")])
            .unwrap();
        assert_eq!(viable.edges().len(), 1);
        assert_eq!(viable.initial_edge_count(), 1);
    }

    #[test]
    fn lifetimes_do_not_split_an_edge() {
        let engine = ViabilityEngine::new(labels(&["A"]));
        let short = edge("A", "T1", "X");
        let long = EfficiencyEdge {
            lifetime: Some(40),
            ..short.clone()
        };
        let viable = engine.close(vec![short, long]).unwrap();
        assert_eq!(viable.edges().len(), 1);
        assert_eq!(viable.initial_edge_count(), 1);
        assert_eq!(viable.edges()[0].lifetime, Some(40));
    }

    #[test]
    fn empty_physical_set_is_configuration_error() {
        let engine = ViabilityEngine::new(BTreeSet::new());
        let err = engine.close(vec![edge("A", "T1", "B")]).unwrap_err();
        assert!(matches!(err, HzError::Configuration { .. }));
    }

    #[test]
    fn non_physical_input_is_data_integrity_error() {
        let engine = ViabilityEngine::new(labels(&["A"]));
        let err = engine.close(vec![edge("CO2", "T1", "A")]).unwrap_err();
        assert!(matches!(err, HzError::DataIntegrity { .. }));
    }

    #[test]
    fn no_edges_yields_empty_set() {
        let engine = ViabilityEngine::new(BTreeSet::new());
        let viable = engine.close(Vec::new()).unwrap();
        assert!(viable.is_empty());
        assert!(viable.technologies().is_empty());
        assert!(viable.processes().is_empty());
    }
}
