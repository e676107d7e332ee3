//! The generic table projector.
//!
//! One routine interprets every [`ParamSpec`]: read the rows, apply the
//! window, filter by viability and shape the result as a set or a keyed
//! parameter.

use hz_core::{HzError, HzResult, Key, Label, Row, TimeWindow, Value};
use hz_network::{ViabilitySet, whole_table_cleanup};
use hz_store::RelationalStore;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, error, info, warn};

use crate::loader;
use crate::policy::{ParamSpec, Source, Target, Validation};
use crate::projection::ParameterProjection;
use crate::registry::{self, REGISTRY};

/// How rows are scoped and validated.
#[derive(Debug, Clone, Copy)]
pub enum ProjectionMode<'a> {
    /// Full horizon: no window bounds, no viability filtering.
    FullHorizon,
    /// One myopic window, validated against that window's viability set.
    Windowed {
        window: TimeWindow,
        viability: &'a ViabilitySet,
    },
}

impl ProjectionMode<'_> {
    pub fn window(&self) -> Option<&TimeWindow> {
        match self {
            ProjectionMode::FullHorizon => None,
            ProjectionMode::Windowed { window, .. } => Some(window),
        }
    }

    pub fn viability(&self) -> Option<&ViabilitySet> {
        match self {
            ProjectionMode::FullHorizon => None,
            ProjectionMode::Windowed { viability, .. } => Some(viability),
        }
    }
}

pub struct TableProjector<'a, S: RelationalStore> {
    store: &'a S,
    mode: ProjectionMode<'a>,
}

impl<'a, S: RelationalStore> TableProjector<'a, S> {
    pub fn new(store: &'a S, mode: ProjectionMode<'a>) -> Self {
        Self { store, mode }
    }

    pub fn mode(&self) -> &ProjectionMode<'a> {
        &self.mode
    }

    /// Project one parameter or set.
    ///
    /// Returns `None` when the source holds no rows at all, so the model's own
    /// defaults apply. Rows that exist but are all filtered out still produce
    /// an (empty) projection.
    pub fn project(&self, spec: &ParamSpec) -> HzResult<Option<ParameterProjection>> {
        registry::check_spec(spec)?;

        let rows = self.fetch(spec)?;
        if rows.is_empty() {
            info!(name = spec.name, "no values for parameter or set");
            return Ok(None);
        }
        let fetched = rows.len();

        let projection = match spec.target {
            Target::Set { sorted } => self.project_set(spec, rows, sorted),
            Target::Param => self.project_param(spec, rows)?,
        };
        debug!(
            name = spec.name,
            fetched,
            projected = projection.len(),
            "projected"
        );
        Ok(Some(projection))
    }

    /// Project the whole registry in declaration order, skipping sparse entries.
    pub fn project_all(&self) -> HzResult<Vec<(&'static str, ParameterProjection)>> {
        let mut out = Vec::with_capacity(REGISTRY.len());
        for spec in REGISTRY {
            if let Some(projection) = self.project(spec)? {
                out.push((spec.name, projection));
            }
        }
        Ok(out)
    }

    fn fetch(&self, spec: &ParamSpec) -> HzResult<Vec<Row>> {
        let queries = match spec.source {
            Source::Efficiency => return self.efficiency_rows(),
            Source::Tables(queries) => queries,
        };

        let window = self.mode.window();
        let mut rows = Vec::new();
        for query in queries {
            if query.windowed_only && window.is_none() {
                continue;
            }
            if query.optional && !self.store.table_exists(query.table)? {
                debug!(name = spec.name, table = query.table, "optional table absent");
                continue;
            }
            let predicate = query.predicate(window);
            rows.extend(
                self.store
                    .select(query.table, query.columns, predicate.as_ref())?,
            );
        }
        Ok(rows)
    }

    fn efficiency_rows(&self) -> HzResult<Vec<Row>> {
        if let Some(viable) = self.mode.viability() {
            return Ok(viable.edges().iter().map(loader::edge_row).collect());
        }

        let edges = loader::load_full_edges(self.store)?;
        if edges.is_empty() {
            return Ok(Vec::new());
        }
        let physical = loader::load_physical_commodities(self.store)?;
        let report = whole_table_cleanup(edges, &physical)?;
        Ok(report.kept.iter().map(loader::edge_row).collect())
    }

    fn project_set(&self, spec: &ParamSpec, rows: Vec<Row>, sorted: bool) -> ParameterProjection {
        let filter = self
            .mode
            .viability()
            .zip(spec.validation.domain());

        let mut members: IndexSet<Value> = IndexSet::with_capacity(rows.len());
        for value in rows.into_iter().filter_map(|row| row.into_iter().next()) {
            if let Some((viable, domain)) = filter {
                if !domain.contains(viable, &value) {
                    continue;
                }
            }
            members.insert(value);
        }
        if sorted {
            members.sort();
        }
        ParameterProjection::Set(members.into_iter().collect())
    }

    fn project_param(&self, spec: &ParamSpec, rows: Vec<Row>) -> HzResult<ParameterProjection> {
        let viable = match (self.mode.viability(), spec.validation) {
            (Some(viable), validation) if validation != Validation::None => Some(viable),
            _ => None,
        };

        if viable.is_some() && spec.validation == Validation::Processes {
            screen_region_groups(spec, &rows);
        }

        let mut map: IndexMap<Key, Value> = IndexMap::with_capacity(rows.len());
        for mut row in rows {
            let Some(value) = row.pop() else {
                return Err(HzError::schema(format!("{}: empty row", spec.name)));
            };
            let key = row;
            if let Some(viable) = viable {
                if !admits(spec, viable, &key)? {
                    continue;
                }
            }
            // a scalar takes its first row
            if key.is_empty() && map.contains_key(&key) {
                warn!(name = spec.name, ignored = ?value, "extra row for a scalar parameter ignored");
                continue;
            }
            map.insert(key, value);
        }
        Ok(ParameterProjection::Param(map))
    }
}

fn key_at<'k>(spec: &ParamSpec, key: &'k Key, position: usize) -> HzResult<&'k Value> {
    key.get(position).ok_or_else(|| {
        HzError::schema(format!(
            "{}: key position {} outside key of arity {}",
            spec.name,
            position,
            key.len()
        ))
    })
}

/// Whether a parameter key passes the spec's validation.
fn admits(spec: &ParamSpec, viable: &ViabilitySet, key: &Key) -> HzResult<bool> {
    match spec.validation {
        Validation::None => Ok(true),
        Validation::Processes => {
            let &[r, t, v] = spec.key_positions else {
                return Err(HzError::schema(format!(
                    "{}: process validation without region, tech and vintage positions",
                    spec.name
                )));
            };
            let region = key_at(spec, key, r)?.as_text();
            let tech = key_at(spec, key, t)?.as_text();
            let vintage = key_at(spec, key, v)?.as_year();
            Ok(match (region, tech, vintage) {
                (Some(region), Some(tech), Some(vintage)) => {
                    viable.contains_process(region, tech, vintage)
                }
                _ => false,
            })
        }
        Validation::Columns(checks) => {
            for (position, domain) in checks {
                if !domain.contains(viable, key_at(spec, key, *position)?) {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        simple => {
            let Some(domain) = simple.domain() else {
                return Ok(true);
            };
            match spec.key_positions.first() {
                Some(&position) => Ok(domain.contains(viable, key_at(spec, key, position)?)),
                // whole-key check only makes sense for single-column keys
                None => Ok(key.len() == 1 && domain.contains(viable, &key[0])),
            }
        }
    }
}

/// Region groups should never reach a process-validated parameter.
fn screen_region_groups(spec: &ParamSpec, rows: &[Row]) {
    let Some(&position) = spec.key_positions.first() else {
        return;
    };
    let groups: IndexSet<Label> = rows
        .iter()
        .filter_map(|row| row.get(position).and_then(Value::as_label))
        .filter(Label::is_region_group)
        .collect();
    if !groups.is_empty() {
        error!(
            name = spec.name,
            groups = ?groups,
            "region groups found while screening processes; likely a mis-declared parameter"
        );
    }
}
