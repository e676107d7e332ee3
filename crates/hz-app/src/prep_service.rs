//! Per-window build service.

use std::path::Path;
use std::time::Instant;

use hz_core::TimeWindow;
use hz_network::ViabilitySet;
use hz_projection::{ProjectionMode, REGISTRY, TableProjector, refresh_viability};
use hz_store::{RelationalStore, SqliteStore};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::assembler::{DataBundle, assemble};
use crate::error::{AppError, AppResult};
use crate::fingerprint::fingerprint;

/// Summary of one build.
#[derive(Debug, Clone, Serialize)]
pub struct WindowReport {
    /// `None` for a full-horizon build.
    pub window: Option<TimeWindow>,
    /// Distinct edges the closure started from (windowed builds only).
    pub initial_edges: usize,
    pub retained_edges: usize,
    pub technologies: usize,
    pub processes: usize,
    pub suppressed: Vec<String>,
    pub rounds: usize,
    /// Entry count per projected parameter or set, in bundle order.
    pub entries: IndexMap<String, usize>,
    /// Registry names with no source rows at all.
    pub sparse: Vec<String>,
    pub elapsed_s: f64,
    pub prepared_at: String,
}

/// The bundle for one window with its fingerprint and report.
#[derive(Debug, Clone)]
pub struct PreparedWindow {
    pub bundle: DataBundle,
    pub fingerprint: String,
    pub report: WindowReport,
}

/// Build the bundle for a window, or for the full horizon when `window` is `None`.
///
/// Viability is recomputed from the store on every call. Any fatal error
/// aborts the build; no partial bundle is returned.
pub fn prepare<S: RelationalStore>(
    store: &S,
    window: Option<TimeWindow>,
) -> AppResult<PreparedWindow> {
    let start = Instant::now();

    let viability = match &window {
        Some(w) => Some(refresh_viability(store, w)?),
        None => None,
    };
    let mode = match (window, viability.as_ref()) {
        (Some(window), Some(viability)) => ProjectionMode::Windowed { window, viability },
        _ => ProjectionMode::FullHorizon,
    };

    let projections = TableProjector::new(store, mode).project_all()?;
    let bundle = assemble(projections);
    let fingerprint = fingerprint(&bundle)?;

    let report = build_report(window, viability.as_ref(), &bundle, start);
    info!(
        entries = bundle.len(),
        sparse = report.sparse.len(),
        fingerprint = %fingerprint,
        elapsed_s = report.elapsed_s,
        "window prepared"
    );

    Ok(PreparedWindow {
        bundle,
        fingerprint,
        report,
    })
}

fn build_report(
    window: Option<TimeWindow>,
    viability: Option<&ViabilitySet>,
    bundle: &DataBundle,
    start: Instant,
) -> WindowReport {
    let entries: IndexMap<String, usize> = bundle
        .data
        .iter()
        .map(|(name, projection)| (name.clone(), projection.len()))
        .collect();
    let sparse = REGISTRY
        .iter()
        .filter(|spec| !bundle.data.contains_key(spec.name))
        .map(|spec| spec.name.to_string())
        .collect();

    let (initial_edges, retained_edges, technologies, processes, suppressed, rounds) =
        match viability {
            Some(v) => (
                v.initial_edge_count(),
                v.edges().len(),
                v.technologies().len(),
                v.processes().len(),
                v.suppressed().iter().map(ToString::to_string).collect(),
                v.rounds().len(),
            ),
            None => (0, 0, 0, 0, Vec::new(), 0),
        };

    WindowReport {
        window,
        initial_edges,
        retained_edges,
        technologies,
        processes,
        suppressed,
        rounds,
        entries,
        sparse,
        elapsed_s: start.elapsed().as_secs_f64(),
        prepared_at: chrono::Utc::now().to_rfc3339(),
    }
}

pub fn open_store(path: &Path) -> AppResult<SqliteStore> {
    if !path.exists() {
        return Err(AppError::InvalidInput(format!(
            "database not found: {}",
            path.display()
        )));
    }
    Ok(SqliteStore::open_read_only(path)?)
}

/// Open a SQLite database read-only and build one window from it.
pub fn prepare_database(path: &Path, window: Option<TimeWindow>) -> AppResult<PreparedWindow> {
    let store = open_store(path)?;
    prepare(&store, window)
}

/// Write the bundle as pretty JSON.
pub fn write_bundle(path: &Path, prepared: &PreparedWindow) -> AppResult<()> {
    let content = serde_json::to_string_pretty(&prepared.bundle)?;
    std::fs::write(path, content).map_err(|e| AppError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(path = %path.display(), "bundle written");
    Ok(())
}
