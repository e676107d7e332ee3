//! Read-only diagnostics over an input store.

use hz_core::TimeWindow;
use hz_network::{CleanupReport, ViabilitySet, whole_table_cleanup};
use hz_projection::{load_full_edges, load_physical_commodities, refresh_viability, required_schema};
use hz_store::RelationalStore;
use serde::Serialize;

use crate::error::AppResult;

/// A table the loader reads that the store lacks, in whole or in part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaGap {
    pub table: &'static str,
    /// Every reader tolerates the table's absence.
    pub optional: bool,
    pub missing_table: bool,
    pub missing_columns: Vec<&'static str>,
}

/// Compare the store against the tables and columns the registry reads.
///
/// An absent optional table is not a gap.
pub fn schema_gaps<S: RelationalStore>(store: &S) -> AppResult<Vec<SchemaGap>> {
    let mut gaps = Vec::new();
    for req in required_schema() {
        if !store.table_exists(req.table)? {
            if !req.optional {
                gaps.push(SchemaGap {
                    table: req.table,
                    optional: false,
                    missing_table: true,
                    missing_columns: req.columns,
                });
            }
            continue;
        }
        let present = store.table_columns(req.table)?;
        let missing_columns: Vec<&'static str> = req
            .columns
            .iter()
            .copied()
            .filter(|c| !present.iter().any(|p| p == c))
            .collect();
        if !missing_columns.is_empty() {
            gaps.push(SchemaGap {
                table: req.table,
                optional: req.optional,
                missing_table: false,
                missing_columns,
            });
        }
    }
    Ok(gaps)
}

/// Whole-table cleanup advisories over the full-horizon `Efficiency` table.
pub fn audit_efficiency<S: RelationalStore>(store: &S) -> AppResult<CleanupReport> {
    let edges = load_full_edges(store)?;
    let physical = load_physical_commodities(store)?;
    Ok(whole_table_cleanup(edges, &physical)?)
}

/// The viability closure for one window.
pub fn closure<S: RelationalStore>(store: &S, window: &TimeWindow) -> AppResult<ViabilitySet> {
    Ok(refresh_viability(store, window)?)
}
