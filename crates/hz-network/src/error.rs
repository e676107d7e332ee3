//! Network-specific error types.

use hz_core::{CommodityId, HzError, TechId};
use thiserror::Error;

/// Conversion network validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// No commodity is flagged physical, so no edge can be validated.
    #[error("No physical commodities found; check commodity flags")]
    NoPhysicalCommodities,

    /// An edge consumes a commodity that is not flagged physical.
    #[error("Tech {tech} has a non-physical input: {input}")]
    NonPhysicalInput { tech: TechId, input: CommodityId },
}

impl From<NetworkError> for HzError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::NoPhysicalCommodities => HzError::Configuration {
                what: err.to_string(),
            },
            NetworkError::NonPhysicalInput { .. } => HzError::DataIntegrity {
                what: err.to_string(),
            },
        }
    }
}
