//! Application service layer for horizon.
//!
//! Ties the store, the viability closure and the projector together into one
//! per-window build, and provides the assembly, fingerprinting, configuration
//! and audit services shared by the command-line front end.

pub mod assembler;
pub mod audit;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod prep_service;

// Re-export key types for convenience
pub use assembler::{DataBundle, assemble};
pub use audit::{SchemaGap, audit_efficiency, closure, schema_gaps};
pub use config::{PrepConfig, load_config, parse_config};
pub use error::{AppError, AppResult};
pub use fingerprint::fingerprint;
pub use prep_service::{
    PreparedWindow, WindowReport, open_store, prepare, prepare_database, write_bundle,
};
