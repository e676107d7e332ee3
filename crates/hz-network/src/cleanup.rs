//! Whole-table cleanup for full-horizon (non-windowed) builds.
//!
//! A single global visibility pass, coarser than the closure: an edge is
//! dropped when its physical output never appears as an input anywhere in the
//! table. Inputs that nothing produces are only reported; boundary and
//! pre-existing edges legitimately have them.

use std::collections::BTreeSet;

use hz_core::{CommodityId, HzResult};
use tracing::warn;

use crate::edge::EfficiencyEdge;
use crate::validate;

/// Result of [`whole_table_cleanup`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Surviving edges in their original order.
    pub kept: Vec<EfficiencyEdge>,
    /// Edges whose physical output has no consumer in the table.
    pub suppressed: Vec<EfficiencyEdge>,
    /// Edges whose input has no producer in the table (advisory only).
    pub unsupplied_inputs: Vec<EfficiencyEdge>,
}

pub fn whole_table_cleanup(
    edges: Vec<EfficiencyEdge>,
    physical: &BTreeSet<CommodityId>,
) -> HzResult<CleanupReport> {
    validate::validate_physical_set(physical)?;

    let visible_inputs: BTreeSet<CommodityId> = edges.iter().map(|e| e.input.clone()).collect();
    let visible_outputs: BTreeSet<CommodityId> =
        edges.iter().map(|e| e.output.clone()).collect();

    let mut report = CleanupReport::default();
    for edge in edges {
        if !visible_outputs.contains(&edge.input) {
            warn!(
                edge = %edge,
                input = %edge.input,
                "no source supplies this input commodity; advisory only"
            );
            report.unsupplied_inputs.push(edge.clone());
        }
        if physical.contains(&edge.output) && !visible_inputs.contains(&edge.output) {
            warn!(
                edge = %edge,
                output = %edge.output,
                "no sink accepts this physical output; either mislabeled as physical or ahead of need; edge suppressed"
            );
            report.suppressed.push(edge);
        } else {
            report.kept.push(edge);
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hz_core::{HzError, Label};

    fn labels(names: &[&str]) -> BTreeSet<CommodityId> {
        names.iter().copied().map(Label::from).collect()
    }

    fn edge(input: &str, tech: &str, output: &str) -> EfficiencyEdge {
        EfficiencyEdge::new("utopia", input, tech, 1990, output, 1.0, None)
    }

    #[test]
    fn drops_unconsumed_physical_output_only_once() {
        // Unlike the closure, the upstream T1 survives even though T2 is dropped
        let report = whole_table_cleanup(
            vec![edge("ethos", "T1", "B"), edge("B", "T2", "C")],
            &labels(&["ethos", "B", "C"]),
        )
        .unwrap();
        assert_eq!(report.kept, vec![edge("ethos", "T1", "B")]);
        assert_eq!(report.suppressed, vec![edge("B", "T2", "C")]);
    }

    #[test]
    fn unsupplied_inputs_are_advisory() {
        let report = whole_table_cleanup(
            vec![edge("ethos", "IMP", "OIL"), edge("OIL", "HEAT", "RH")],
            &labels(&["ethos", "OIL"]),
        )
        .unwrap();
        assert_eq!(report.kept.len(), 2);
        assert!(report.suppressed.is_empty());
        assert_eq!(report.unsupplied_inputs, vec![edge("ethos", "IMP", "OIL")]);
    }

    #[test]
    fn requires_physical_commodities() {
        let err = whole_table_cleanup(vec![], &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, HzError::Configuration { .. }));
    }
}
