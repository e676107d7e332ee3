//! Reads the conversion network out of the store and refreshes viability.

use std::collections::BTreeSet;

use hz_core::{CommodityId, HzError, HzResult, Row, TimeWindow, Value, Year};
use hz_network::{EfficiencyEdge, ViabilityEngine, ViabilitySet};
use hz_store::RelationalStore;
use tracing::{debug, info};

use crate::policy::{Fixed, TableQuery};

/// Key columns of an efficiency row: region, input, tech, vintage, output.
pub const EFFICIENCY_KEY_ARITY: usize = 5;

/// Edges carried over from earlier windows plus those newly in view.
pub const MYOPIC_EFFICIENCY: TableQuery = TableQuery::new(
    "MyopicEfficiency",
    &[
        "region",
        "input_comm",
        "tech",
        "vintage",
        "output_comm",
        "efficiency",
        "lifetime",
    ],
);

/// The full-horizon efficiency table.
pub const EFFICIENCY: TableQuery = TableQuery::new(
    "Efficiency",
    &[
        "regions",
        "input_comm",
        "tech",
        "vintage",
        "output_comm",
        "efficiency",
    ],
);

pub const PHYSICAL_COMMODITIES: TableQuery =
    TableQuery::new("commodities", &["comm_name"]).filter(Fixed::Eq("flag", "p"));

/// Queries issued outside the registry.
pub const LOADER_QUERIES: &[TableQuery] = &[MYOPIC_EFFICIENCY, EFFICIENCY, PHYSICAL_COMMODITIES];

fn select<S: RelationalStore>(store: &S, query: &TableQuery) -> HzResult<Vec<Row>> {
    let predicate = query.predicate(None);
    Ok(store.select(query.table, query.columns, predicate.as_ref())?)
}

pub fn load_physical_commodities<S: RelationalStore>(store: &S) -> HzResult<BTreeSet<CommodityId>> {
    let rows = select(store, &PHYSICAL_COMMODITIES)?;
    rows.iter()
        .map(|row| {
            row[0].as_label().ok_or_else(|| {
                HzError::data_integrity(format!("commodities: non-text comm_name {}", row[0]))
            })
        })
        .collect()
}

fn bad_row(table: &str, row: &Row, what: &str) -> HzError {
    HzError::data_integrity(format!("{}: {} in row {:?}", table, what, row))
}

fn text(table: &str, row: &Row, i: usize) -> HzResult<CommodityId> {
    row[i]
        .as_label()
        .ok_or_else(|| bad_row(table, row, "expected text"))
}

fn year(table: &str, row: &Row, i: usize) -> HzResult<Year> {
    row[i]
        .as_year()
        .ok_or_else(|| bad_row(table, row, "expected integer year"))
}

fn parse_edge(table: &str, row: &Row, with_lifetime: bool) -> HzResult<EfficiencyEdge> {
    let efficiency = row[5]
        .as_f64()
        .ok_or_else(|| bad_row(table, row, "expected numeric efficiency"))?;
    let lifetime = if with_lifetime {
        Some(year(table, row, 6)?)
    } else {
        None
    };
    Ok(EfficiencyEdge::new(
        text(table, row, 0)?,
        text(table, row, 1)?,
        text(table, row, 2)?,
        year(table, row, 3)?,
        text(table, row, 4)?,
        efficiency,
        lifetime,
    ))
}

/// Edges from `MyopicEfficiency` still alive at the window's base year.
pub fn load_alive_edges<S: RelationalStore>(
    store: &S,
    window: &TimeWindow,
) -> HzResult<Vec<EfficiencyEdge>> {
    let table = MYOPIC_EFFICIENCY.table;
    let rows = select(store, &MYOPIC_EFFICIENCY)?;
    let polled = rows.len();

    let mut edges = Vec::with_capacity(polled);
    for row in &rows {
        let edge = parse_edge(table, row, true)?;
        let alive = edge
            .lifetime
            .is_some_and(|life| window.admits_edge(edge.vintage, life));
        if alive {
            edges.push(edge);
        }
    }
    debug!(polled, alive = edges.len(), base_year = window.base_year(), "loaded edges from {}", table);
    Ok(edges)
}

/// Every row of the full-horizon `Efficiency` table, in store order.
pub fn load_full_edges<S: RelationalStore>(store: &S) -> HzResult<Vec<EfficiencyEdge>> {
    let rows = select(store, &EFFICIENCY)?;
    rows.iter()
        .map(|row| parse_edge(EFFICIENCY.table, row, false))
        .collect()
}

/// Rebuild the viability set for a window from the current store contents.
pub fn refresh_viability<S: RelationalStore>(
    store: &S,
    window: &TimeWindow,
) -> HzResult<ViabilitySet> {
    let physical = load_physical_commodities(store)?;
    let edges = load_alive_edges(store, window)?;
    let viable = ViabilityEngine::new(physical).close(edges)?;
    info!(
        base_year = window.base_year(),
        technologies = viable.technologies().len(),
        processes = viable.processes().len(),
        suppressed = viable.suppressed().len(),
        "viability refreshed"
    );
    Ok(viable)
}

/// The canonical row form of an edge: (region, input, tech, vintage, output, efficiency).
pub(crate) fn edge_row(edge: &EfficiencyEdge) -> Row {
    vec![
        Value::from(&edge.region),
        Value::from(&edge.input),
        Value::from(&edge.tech),
        Value::from(edge.vintage),
        Value::from(&edge.output),
        Value::Real(edge.efficiency),
    ]
}
