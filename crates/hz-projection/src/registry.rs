//! The static name -> policy registry.
//!
//! Adding a model parameter is a data change here: declare its source query
//! and its validation, and the projector handles the rest.

use std::collections::{BTreeMap, HashSet};

use hz_core::{HzError, HzResult};

use crate::loader;
use crate::policy::{Domain, Fixed, ParamSpec, Scope, Source, TableQuery, Target, Validation};

// === time sets ===

const TIME_EXIST: &[TableQuery] = &[TableQuery::new("time_periods", &["t_periods"])
    .scope(Scope::Before("t_periods"))
    .unwindowed(Fixed::Eq("flag", "e"))];

const TIME_FUTURE: &[TableQuery] = &[TableQuery::new("time_periods", &["t_periods"])
    .scope(Scope::FutureHorizon("t_periods"))
    .unwindowed(Fixed::Eq("flag", "f"))];

const TIME_OF_DAY: &[TableQuery] = &[TableQuery::new("time_of_day", &["t_day"])];

const TIME_SEASON: &[TableQuery] = &[TableQuery::new("time_season", &["t_season"])];

// === region sets ===

const REGIONS: &[TableQuery] = &[TableQuery::new("regions", &["regions"])];

/// Tables whose `regions` column may carry region-group tokens (`R1+R2`).
const REGION_GROUPS: &[TableQuery] = &[
    TableQuery::new("MaxActivity", &["regions"]).optional(),
    TableQuery::new("MinActivity", &["regions"]).optional(),
    TableQuery::new("MinAnnualCapacityFactor", &["regions"]).optional(),
    TableQuery::new("MaxAnnualCapacityFactor", &["regions"]).optional(),
    TableQuery::new("EmissionLimit", &["regions"]).optional(),
    TableQuery::new("MinActivityGroup", &["regions"]).optional(),
    TableQuery::new("MaxActivityGroup", &["regions"]).optional(),
    TableQuery::new("MinCapacityGroup", &["regions"]).optional(),
    TableQuery::new("MaxCapacityGroup", &["regions"]).optional(),
];

// === technology sets ===

const TECH_RESOURCE: &[TableQuery] =
    &[TableQuery::new("technologies", &["tech"]).filter(Fixed::Eq("flag", "r"))];

const TECH_PRODUCTION: &[TableQuery] =
    &[TableQuery::new("technologies", &["tech"]).filter(Fixed::StartsWith("flag", "p"))];

const TECH_BASELOAD: &[TableQuery] =
    &[TableQuery::new("technologies", &["tech"]).filter(Fixed::Eq("flag", "pb"))];

const TECH_STORAGE: &[TableQuery] =
    &[TableQuery::new("technologies", &["tech"]).filter(Fixed::Eq("flag", "ps"))];

const TECH_RESERVE: &[TableQuery] = &[TableQuery::new("tech_reserve", &["tech"])];

const TECH_RAMPING: &[TableQuery] = &[
    TableQuery::new("RampUp", &["tech"]).optional(),
    TableQuery::new("RampDown", &["tech"]).optional(),
];

const TECH_CURTAILMENT: &[TableQuery] = &[TableQuery::new("tech_curtailment", &["tech"])];

const TECH_EXCHANGE: &[TableQuery] = &[TableQuery::new("tech_exchange", &["tech"])];

const TECH_ANNUAL: &[TableQuery] = &[TableQuery::new("tech_annual", &["tech"])];

const TECH_VARIABLE: &[TableQuery] = &[TableQuery::new("tech_variable", &["tech"]).optional()];

// === commodity sets ===

const COMMODITY_DEMAND: &[TableQuery] =
    &[TableQuery::new("commodities", &["comm_name"]).filter(Fixed::Eq("flag", "d"))];

const COMMODITY_EMISSIONS: &[TableQuery] =
    &[TableQuery::new("commodities", &["comm_name"]).filter(Fixed::Eq("flag", "e"))];

const COMMODITY_PHYSICAL: &[TableQuery] = &[loader::PHYSICAL_COMMODITIES];

// === parameters ===

const EXISTING_CAPACITY: &[TableQuery] = &[
    TableQuery::new("MyopicCapacity", &["region", "tech", "vintage", "capacity"])
        .optional()
        .windowed_only(),
    TableQuery::new("ExistingCapacity", &["regions", "tech", "vintage", "exist_cap"]),
];

const GLOBAL_DISCOUNT_RATE: &[TableQuery] = &[TableQuery::new("GlobalDiscountRate", &["rate"])];

const SEG_FRAC: &[TableQuery] = &[TableQuery::new(
    "SegFrac",
    &["season_name", "time_of_day_name", "segfrac"],
)];

const DEMAND_SPECIFIC_DISTRIBUTION: &[TableQuery] = &[TableQuery::new(
    "DemandSpecificDistribution",
    &["regions", "season_name", "time_of_day_name", "demand_name", "dds"],
)];

const DEMAND: &[TableQuery] = &[TableQuery::new(
    "Demand",
    &["regions", "periods", "demand_comm", "demand"],
)
.scope(Scope::DemandHorizon("periods"))];

const CAPACITY_TO_ACTIVITY: &[TableQuery] =
    &[TableQuery::new("CapacityToActivity", &["regions", "tech", "c2a"])];

const CAPACITY_FACTOR_TECH: &[TableQuery] = &[TableQuery::new(
    "CapacityFactorTech",
    &["regions", "season_name", "time_of_day_name", "tech", "cf_tech"],
)];

const CAPACITY_FACTOR_PROCESS: &[TableQuery] = &[TableQuery::new(
    "CapacityFactorProcess",
    &["regions", "season_name", "time_of_day_name", "tech", "vintage", "cf_process"],
)];

const LIFETIME_TECH: &[TableQuery] =
    &[TableQuery::new("LifetimeTech", &["regions", "tech", "life"])];

const LIFETIME_PROCESS: &[TableQuery] = &[TableQuery::new(
    "LifetimeProcess",
    &["regions", "tech", "vintage", "life_process"],
)];

const LIFETIME_LOAN_TECH: &[TableQuery] =
    &[TableQuery::new("LifetimeLoanTech", &["regions", "tech", "loan"])];

const TECH_INPUT_SPLIT: &[TableQuery] = &[TableQuery::new(
    "TechInputSplit",
    &["regions", "periods", "input_comm", "tech", "ti_split"],
)
.scope(Scope::DemandHorizon("periods"))];

const TECH_INPUT_SPLIT_AVERAGE: &[TableQuery] = &[TableQuery::new(
    "TechInputSplitAverage",
    &["regions", "periods", "input_comm", "tech", "ti_split"],
)
.scope(Scope::DemandHorizon("periods"))
.optional()];

const COST_FIXED: &[TableQuery] = &[TableQuery::new(
    "CostFixed",
    &["regions", "periods", "tech", "vintage", "cost_fixed"],
)
.scope(Scope::DemandHorizon("periods"))];

// existing vintages are screened by the base year; the process set handles the far end
const COST_INVEST: &[TableQuery] = &[TableQuery::new(
    "CostInvest",
    &["regions", "tech", "vintage", "cost_invest"],
)
.scope(Scope::FromBase("vintage"))];

const COST_VARIABLE: &[TableQuery] = &[TableQuery::new(
    "CostVariable",
    &["regions", "periods", "tech", "vintage", "cost_variable"],
)
.scope(Scope::DemandHorizon("periods"))];

const DISCOUNT_RATE: &[TableQuery] = &[TableQuery::new(
    "DiscountRate",
    &["regions", "tech", "vintage", "tech_rate"],
)
.scope(Scope::FromBase("vintage"))];

const MIN_CAPACITY: &[TableQuery] = &[TableQuery::new(
    "MinCapacity",
    &["regions", "periods", "tech", "mincap"],
)
.scope(Scope::DemandHorizon("periods"))];

const MAX_CAPACITY: &[TableQuery] = &[TableQuery::new(
    "MaxCapacity",
    &["regions", "periods", "tech", "maxcap"],
)
.scope(Scope::DemandHorizon("periods"))];

const MAX_RESOURCE: &[TableQuery] =
    &[TableQuery::new("MaxResource", &["regions", "tech", "maxres"])];

const MAX_ACTIVITY: &[TableQuery] = &[TableQuery::new(
    "MaxActivity",
    &["regions", "periods", "tech", "maxact"],
)
.scope(Scope::DemandHorizon("periods"))
.optional()];

const MIN_ACTIVITY: &[TableQuery] = &[TableQuery::new(
    "MinActivity",
    &["regions", "periods", "tech", "minact"],
)
.scope(Scope::DemandHorizon("periods"))];

const GROWTH_RATE_MAX: &[TableQuery] =
    &[TableQuery::new("GrowthRateMax", &["regions", "tech", "growthrate_max"])];

const GROWTH_RATE_SEED: &[TableQuery] =
    &[TableQuery::new("GrowthRateSeed", &["regions", "tech", "growthrate_seed"])];

const EMISSION_LIMIT: &[TableQuery] = &[TableQuery::new(
    "EmissionLimit",
    &["regions", "periods", "emis_comm", "emis_limit"],
)
.scope(Scope::DemandHorizon("periods"))];

// region groups may appear here, so the process set is too strict: check the
// tech, vintage and both flow commodities separately
const EMISSION_ACTIVITY: &[TableQuery] = &[TableQuery::new(
    "EmissionActivity",
    &[
        "regions",
        "emis_comm",
        "input_comm",
        "tech",
        "vintage",
        "output_comm",
        "emis_act",
    ],
)
.scope(Scope::FromBase("vintage"))];

const LINKED_TECHS: &[TableQuery] = &[TableQuery::new(
    "LinkedTechs",
    &["primary_region", "primary_tech", "emis_comm", "linked_tech"],
)];

const RAMP_UP: &[TableQuery] =
    &[TableQuery::new("RampUp", &["regions", "tech", "ramp_up"]).optional()];

const RAMP_DOWN: &[TableQuery] =
    &[TableQuery::new("RampDown", &["regions", "tech", "ramp_down"]).optional()];

const CAPACITY_CREDIT: &[TableQuery] = &[TableQuery::new(
    "CapacityCredit",
    &["regions", "periods", "tech", "vintage", "cf_tech"],
)
.scope(Scope::DemandHorizon("periods"))];

const PLANNING_RESERVE_MARGIN: &[TableQuery] = &[TableQuery::new(
    "PlanningReserveMargin",
    &["regions", "reserve_margin"],
)];

const STORAGE_DURATION: &[TableQuery] =
    &[TableQuery::new("StorageDuration", &["regions", "tech", "duration"])];

/// Every parameter and set handed to the model, in load order.
pub static REGISTRY: &[ParamSpec] = &[
    // time
    ParamSpec::set("time_exist", Source::Tables(TIME_EXIST)),
    ParamSpec::set("time_future", Source::Tables(TIME_FUTURE)),
    ParamSpec::set("time_of_day", Source::Tables(TIME_OF_DAY)),
    ParamSpec::set("time_season", Source::Tables(TIME_SEASON)),
    // regions
    ParamSpec::set("regions", Source::Tables(REGIONS)),
    ParamSpec::set("RegionalGlobalIndices", Source::Tables(REGION_GROUPS)).sorted(),
    // technologies
    ParamSpec::set("tech_resource", Source::Tables(TECH_RESOURCE))
        .validate(Validation::Technologies),
    ParamSpec::set("tech_production", Source::Tables(TECH_PRODUCTION))
        .validate(Validation::Technologies),
    ParamSpec::set("tech_baseload", Source::Tables(TECH_BASELOAD))
        .validate(Validation::Technologies),
    ParamSpec::set("tech_storage", Source::Tables(TECH_STORAGE))
        .validate(Validation::Technologies),
    ParamSpec::set("tech_reserve", Source::Tables(TECH_RESERVE))
        .validate(Validation::Technologies),
    ParamSpec::set("tech_ramping", Source::Tables(TECH_RAMPING))
        .sorted()
        .validate(Validation::Technologies),
    ParamSpec::set("tech_curtailment", Source::Tables(TECH_CURTAILMENT))
        .validate(Validation::Technologies),
    ParamSpec::set("tech_exchange", Source::Tables(TECH_EXCHANGE))
        .validate(Validation::Technologies),
    ParamSpec::set("tech_annual", Source::Tables(TECH_ANNUAL))
        .validate(Validation::Technologies),
    ParamSpec::set("tech_variable", Source::Tables(TECH_VARIABLE))
        .validate(Validation::Technologies),
    // commodities
    ParamSpec::set("commodity_demand", Source::Tables(COMMODITY_DEMAND))
        .validate(Validation::Commodities),
    ParamSpec::set("commodity_emissions", Source::Tables(COMMODITY_EMISSIONS)),
    // the model wants zero symmetric difference between physical and input commodities
    ParamSpec::set("commodity_physical", Source::Tables(COMMODITY_PHYSICAL))
        .validate(Validation::InputCommodities),
    // parameters
    ParamSpec::param("Efficiency", Source::Efficiency),
    ParamSpec::param("ExistingCapacity", Source::Tables(EXISTING_CAPACITY))
        .validate(Validation::Processes)
        .at(&[0, 1, 2]),
    ParamSpec::param("GlobalDiscountRate", Source::Tables(GLOBAL_DISCOUNT_RATE)),
    ParamSpec::param("SegFrac", Source::Tables(SEG_FRAC)),
    ParamSpec::param(
        "DemandSpecificDistribution",
        Source::Tables(DEMAND_SPECIFIC_DISTRIBUTION),
    ),
    ParamSpec::param("Demand", Source::Tables(DEMAND)),
    ParamSpec::param("CapacityToActivity", Source::Tables(CAPACITY_TO_ACTIVITY))
        .validate(Validation::Technologies)
        .at(&[1]),
    ParamSpec::param("CapacityFactorTech", Source::Tables(CAPACITY_FACTOR_TECH))
        .validate(Validation::Technologies)
        .at(&[3]),
    ParamSpec::param("CapacityFactorProcess", Source::Tables(CAPACITY_FACTOR_PROCESS))
        .validate(Validation::Processes)
        .at(&[0, 3, 4]),
    ParamSpec::param("LifetimeTech", Source::Tables(LIFETIME_TECH))
        .validate(Validation::Technologies)
        .at(&[1]),
    ParamSpec::param("LifetimeProcess", Source::Tables(LIFETIME_PROCESS))
        .validate(Validation::Processes)
        .at(&[0, 1, 2]),
    ParamSpec::param("LifetimeLoanTech", Source::Tables(LIFETIME_LOAN_TECH))
        .validate(Validation::Technologies)
        .at(&[1]),
    ParamSpec::param("TechInputSplit", Source::Tables(TECH_INPUT_SPLIT))
        .validate(Validation::Technologies)
        .at(&[3]),
    ParamSpec::param("TechInputSplitAverage", Source::Tables(TECH_INPUT_SPLIT_AVERAGE))
        .validate(Validation::Technologies)
        .at(&[3]),
    ParamSpec::param("CostFixed", Source::Tables(COST_FIXED))
        .validate(Validation::Processes)
        .at(&[0, 2, 3]),
    ParamSpec::param("CostInvest", Source::Tables(COST_INVEST))
        .validate(Validation::Processes)
        .at(&[0, 1, 2]),
    ParamSpec::param("CostVariable", Source::Tables(COST_VARIABLE))
        .validate(Validation::Processes)
        .at(&[0, 2, 3]),
    ParamSpec::param("DiscountRate", Source::Tables(DISCOUNT_RATE))
        .validate(Validation::Processes)
        .at(&[0, 1, 2]),
    ParamSpec::param("MinCapacity", Source::Tables(MIN_CAPACITY))
        .validate(Validation::Technologies)
        .at(&[2]),
    ParamSpec::param("MaxCapacity", Source::Tables(MAX_CAPACITY))
        .validate(Validation::Technologies)
        .at(&[2]),
    ParamSpec::param("MaxResource", Source::Tables(MAX_RESOURCE))
        .validate(Validation::Technologies)
        .at(&[1]),
    ParamSpec::param("MaxActivity", Source::Tables(MAX_ACTIVITY))
        .validate(Validation::Technologies)
        .at(&[2]),
    ParamSpec::param("MinActivity", Source::Tables(MIN_ACTIVITY))
        .validate(Validation::Technologies)
        .at(&[2]),
    ParamSpec::param("GrowthRateMax", Source::Tables(GROWTH_RATE_MAX))
        .validate(Validation::Technologies)
        .at(&[1]),
    ParamSpec::param("GrowthRateSeed", Source::Tables(GROWTH_RATE_SEED))
        .validate(Validation::Technologies)
        .at(&[1]),
    ParamSpec::param("EmissionLimit", Source::Tables(EMISSION_LIMIT))
        .validate(Validation::Commodities)
        .at(&[2]),
    ParamSpec::param("EmissionActivity", Source::Tables(EMISSION_ACTIVITY)).validate(
        Validation::Columns(&[
            (3, Domain::Technologies),
            (4, Domain::Vintages),
            (2, Domain::Commodities),
            (5, Domain::Commodities),
        ]),
    ),
    // both linked techs must be viable; checking the primary is enough as they are built together
    ParamSpec::param("LinkedTechs", Source::Tables(LINKED_TECHS))
        .validate(Validation::Technologies)
        .at(&[1]),
    ParamSpec::param("RampUp", Source::Tables(RAMP_UP))
        .validate(Validation::Technologies)
        .at(&[1]),
    ParamSpec::param("RampDown", Source::Tables(RAMP_DOWN))
        .validate(Validation::Technologies)
        .at(&[1]),
    ParamSpec::param("CapacityCredit", Source::Tables(CAPACITY_CREDIT))
        .validate(Validation::Processes)
        .at(&[0, 2, 3]),
    ParamSpec::param("PlanningReserveMargin", Source::Tables(PLANNING_RESERVE_MARGIN)),
    ParamSpec::param("StorageDuration", Source::Tables(STORAGE_DURATION))
        .validate(Validation::Technologies)
        .at(&[1]),
];

/// Find a registry entry by name.
pub fn lookup(name: &str) -> Option<&'static ParamSpec> {
    REGISTRY.iter().find(|spec| spec.name == name)
}

/// Columns each query of a spec yields.
fn arities(spec: &ParamSpec) -> Vec<usize> {
    match spec.source {
        Source::Tables(queries) => queries.iter().map(|q| q.columns.len()).collect(),
        Source::Efficiency => vec![loader::EFFICIENCY_KEY_ARITY + 1],
    }
}

/// Check a single policy against the shape of its source rows.
pub fn check_spec(spec: &ParamSpec) -> HzResult<()> {
    let fail = |what: String| Err(HzError::schema(format!("{}: {}", spec.name, what)));
    let arities = arities(spec);
    if arities.is_empty() {
        return fail("no source query".to_string());
    }
    if arities.windows(2).any(|w| w[0] != w[1]) {
        return fail(format!("source queries disagree on arity: {:?}", arities));
    }
    let arity = arities[0];

    match spec.target {
        Target::Set { .. } => {
            if arity != 1 {
                return fail("unsupported multi-dimensional set".to_string());
            }
            if !spec.key_positions.is_empty() {
                return fail("sets take no key positions".to_string());
            }
            match spec.validation {
                Validation::None
                | Validation::Technologies
                | Validation::Commodities
                | Validation::InputCommodities => Ok(()),
                other => fail(format!("validation {:?} does not apply to a set", other)),
            }
        }
        Target::Param => {
            if arity == 0 {
                return fail("parameter selects no value column".to_string());
            }
            let key_arity = arity - 1;
            if let Some(&p) = spec.key_positions.iter().find(|&&p| p >= key_arity) {
                return fail(format!("key position {} outside key of arity {}", p, key_arity));
            }
            match spec.validation {
                Validation::Processes if spec.key_positions.len() != 3 => {
                    fail("process validation needs region, tech and vintage positions".to_string())
                }
                Validation::Columns(checks) => match checks.iter().find(|(p, _)| *p >= key_arity) {
                    Some((p, _)) => fail(format!("column check {} outside key", p)),
                    None => Ok(()),
                },
                simple
                    if simple.domain().is_some()
                        && spec.key_positions.is_empty()
                        && key_arity != 1 =>
                {
                    fail(format!(
                        "validation {:?} without a key position needs a single-column key, got arity {}",
                        simple, key_arity
                    ))
                }
                _ => Ok(()),
            }
        }
    }
}

/// Check every registry entry and that names are unique.
pub fn check_registry() -> HzResult<()> {
    let mut seen = HashSet::new();
    for spec in REGISTRY {
        if !seen.insert(spec.name) {
            return Err(HzError::schema(format!("duplicate registry entry: {}", spec.name)));
        }
        check_spec(spec)?;
    }
    Ok(())
}

/// A table the registry (or the viability loader) reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRequirement {
    pub table: &'static str,
    pub columns: Vec<&'static str>,
    /// True only when every reader tolerates the table being absent.
    pub optional: bool,
}

/// Derive the input schema: each table with the union of columns read from it.
pub fn required_schema() -> Vec<TableRequirement> {
    let mut tables: BTreeMap<&'static str, TableRequirement> = BTreeMap::new();

    let mut add = |q: &TableQuery| {
        let entry = tables.entry(q.table).or_insert_with(|| TableRequirement {
            table: q.table,
            columns: Vec::new(),
            optional: true,
        });
        for c in q.touched_columns() {
            if !entry.columns.contains(&c) {
                entry.columns.push(c);
            }
        }
        entry.optional &= q.optional;
    };

    for q in loader::LOADER_QUERIES {
        add(q);
    }
    for spec in REGISTRY {
        if let Source::Tables(queries) = spec.source {
            for q in queries {
                add(q);
            }
        }
    }
    tables.into_values().collect()
}
