//! hz-projection: turns relational tables into validated model parameters.
//!
//! Every model parameter or set is declared once in a static registry as a
//! [`ParamSpec`]: where its rows come from, whether it is a set or a keyed
//! parameter, and which viability set (if any) its keys must belong to. One
//! generic routine, [`TableProjector`], interprets those declarations.

pub mod loader;
pub mod policy;
pub mod projection;
pub mod projector;
pub mod registry;

pub use loader::{load_alive_edges, load_full_edges, load_physical_commodities, refresh_viability};
pub use policy::{Domain, Fixed, ParamSpec, Scope, Source, TableQuery, Target, Validation};
pub use projection::ParameterProjection;
pub use projector::{ProjectionMode, TableProjector};
pub use registry::{REGISTRY, TableRequirement, check_registry, check_spec, lookup, required_schema};
