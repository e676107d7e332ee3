//! Core network data structures.

use core::fmt;
use hz_core::{CommodityId, Label, RegionId, TechId, Year};
use ordered_float::OrderedFloat;

/// A (region, technology, vintage) build instance.
///
/// The atomic unit of capacity and cost accounting; ordered field by field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Process {
    pub region: RegionId,
    pub tech: TechId,
    pub vintage: Year,
}

impl Process {
    pub fn new(region: impl Into<Label>, tech: impl Into<Label>, vintage: Year) -> Self {
        Self {
            region: region.into(),
            tech: tech.into(),
            vintage,
        }
    }
}

/// A directed conversion edge scoped to one process.
///
/// Field order is the canonical sort order. `lifetime` is `None` when the
/// source table carries no lifetime column (the full-horizon Efficiency table).
/// It does not take part in flow identity, see [`EfficiencyEdge::same_flow`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EfficiencyEdge {
    pub region: RegionId,
    pub input: CommodityId,
    pub tech: TechId,
    pub vintage: Year,
    pub output: CommodityId,
    pub efficiency: OrderedFloat<f64>,
    pub lifetime: Option<Year>,
}

impl EfficiencyEdge {
    pub fn new(
        region: impl Into<Label>,
        input: impl Into<Label>,
        tech: impl Into<Label>,
        vintage: Year,
        output: impl Into<Label>,
        efficiency: f64,
        lifetime: Option<Year>,
    ) -> Self {
        Self {
            region: region.into(),
            input: input.into(),
            tech: tech.into(),
            vintage,
            output: output.into(),
            efficiency: OrderedFloat(efficiency),
            lifetime,
        }
    }

    /// Same (region, input, tech, vintage, output, efficiency) flow, ignoring lifetime.
    pub fn same_flow(&self, other: &Self) -> bool {
        self.region == other.region
            && self.input == other.input
            && self.tech == other.tech
            && self.vintage == other.vintage
            && self.output == other.output
            && self.efficiency == other.efficiency
    }

    /// The process this edge belongs to.
    pub fn process(&self) -> Process {
        Process {
            region: self.region.clone(),
            tech: self.tech.clone(),
            vintage: self.vintage,
        }
    }
}

impl fmt::Display for EfficiencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}, {}, {})",
            self.region, self.input, self.tech, self.vintage, self.output, self.efficiency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_follows_fields() {
        let mut edges = vec![
            EfficiencyEdge::new("R2", "A", "T1", 2020, "B", 0.5, Some(30)),
            EfficiencyEdge::new("R1", "B", "T2", 2020, "C", 0.8, Some(30)),
            EfficiencyEdge::new("R1", "A", "T9", 2010, "B", 0.5, Some(30)),
            EfficiencyEdge::new("R1", "A", "T1", 2020, "B", 0.5, Some(30)),
        ];
        edges.sort();
        let techs: Vec<&str> = edges.iter().map(|e| e.tech.as_str()).collect();
        assert_eq!(techs, vec!["T1", "T9", "T2", "T1"]);
    }

    #[test]
    fn lifetime_is_not_part_of_the_flow() {
        let a = EfficiencyEdge::new("R1", "A", "T1", 2020, "B", 0.5, Some(30));
        let b = EfficiencyEdge::new("R1", "A", "T1", 2020, "B", 0.5, Some(40));
        let c = EfficiencyEdge::new("R1", "A", "T1", 2020, "B", 0.6, Some(30));
        assert!(a.same_flow(&b));
        assert!(!a.same_flow(&c));
    }

    #[test]
    fn process_accessor() {
        let e = EfficiencyEdge::new("R1", "A", "T1", 2020, "B", 0.5, None);
        assert_eq!(e.process(), Process::new("R1", "T1", 2020));
    }

    #[test]
    fn display_is_tuple_like() {
        let e = EfficiencyEdge::new("R1", "A", "T1", 2020, "B", 0.5, Some(30));
        assert_eq!(e.to_string(), "(R1, A, T1, 2020, B, 0.5)");
    }
}
