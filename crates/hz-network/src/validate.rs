//! Input validation for the closure.

use std::collections::BTreeSet;

use hz_core::CommodityId;

use crate::edge::EfficiencyEdge;
use crate::error::NetworkError;

/// The physical-commodity set must be non-empty.
pub(crate) fn validate_physical_set(
    physical: &BTreeSet<CommodityId>,
) -> Result<(), NetworkError> {
    if physical.is_empty() {
        return Err(NetworkError::NoPhysicalCommodities);
    }
    Ok(())
}

/// Every edge must consume a physical commodity.
pub(crate) fn validate_inputs(
    edges: &[EfficiencyEdge],
    physical: &BTreeSet<CommodityId>,
) -> Result<(), NetworkError> {
    for edge in edges {
        if !physical.contains(&edge.input) {
            return Err(NetworkError::NonPhysicalInput {
                tech: edge.tech.clone(),
                input: edge.input.clone(),
            });
        }
    }
    Ok(())
}
