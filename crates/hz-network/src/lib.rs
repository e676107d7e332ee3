//! hz-network: conversion network layer for horizon.
//!
//! Provides:
//! - Efficiency edges and process triples
//! - The viability closure: a fixed-point reduction of the edge set to the
//!   part of the network where every physical output has a consumer
//! - A coarser whole-table cleanup for non-windowed builds
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use hz_core::Label;
//! use hz_network::{EfficiencyEdge, ViabilityEngine};
//!
//! let physical: BTreeSet<Label> = ["ethos", "oil"].into_iter().map(Label::from).collect();
//! let engine = ViabilityEngine::new(physical);
//! let edges = vec![
//!     EfficiencyEdge::new("R1", "ethos", "IMPOIL", 2020, "oil", 1.0, Some(40)),
//!     EfficiencyEdge::new("R1", "oil", "HEATER", 2020, "heat", 0.9, Some(20)),
//! ];
//! let viable = engine.close(edges).unwrap();
//! assert_eq!(viable.technologies().len(), 2);
//! ```

pub mod cleanup;
pub mod closure;
pub mod edge;
pub mod error;
pub mod indexing;
pub(crate) mod validate;
pub mod viability;

// Re-exports for ergonomics
pub use cleanup::{CleanupReport, whole_table_cleanup};
pub use closure::{ClosureState, ViabilityEngine};
pub use edge::{EfficiencyEdge, Process};
pub use error::NetworkError;
pub use indexing::ProducerIndex;
pub use viability::{SuppressionRound, ViabilitySet};
