//! hz-core: stable foundation for horizon.
//!
//! Contains:
//! - ids (labels for regions/technologies/commodities, years)
//! - value (scalar cells read from the relational store)
//! - window (the rolling-horizon time window)
//! - error (shared fatal error taxonomy)

pub mod error;
pub mod ids;
pub mod value;
pub mod window;

// Re-exports: nice ergonomics for downstream crates
pub use error::{HzError, HzResult};
pub use ids::*;
pub use value::{Key, Row, Value};
pub use window::TimeWindow;
