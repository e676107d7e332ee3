use hz_core::{HzError, TimeWindow, Value};
use hz_network::ViabilitySet;
use hz_projection::{
    ParamSpec, ParameterProjection, ProjectionMode, Source, TableProjector, TableQuery, lookup,
    refresh_viability, required_schema,
};
use hz_store::MemoryStore;

fn t(s: &str) -> Value {
    Value::from(s)
}

fn i(v: i64) -> Value {
    Value::from(v)
}

/// Every table the registry reads, declared and empty.
fn empty_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    for req in required_schema() {
        store.declare(req.table, &req.columns).unwrap();
    }
    store
}

fn myopic(tech: &str, input: &str, output: &str, vintage: i64, life: i64) -> Vec<Value> {
    vec![
        t("R1"),
        t(input),
        t(tech),
        i(vintage),
        t(output),
        Value::real(1.0),
        i(life),
    ]
}

/// ethos -> IMP -> oil -> PP -> elc -> HEATER -> heat, plus GASPROD whose gas
/// output nothing consumes.
fn fixture() -> MemoryStore {
    let mut store = empty_store();
    store
        .insert_all(
            "commodities",
            vec![
                vec![t("ethos"), t("p")],
                vec![t("oil"), t("p")],
                vec![t("elc"), t("p")],
                vec![t("gas"), t("p")],
                vec![t("heat"), t("d")],
                vec![t("co2"), t("e")],
            ],
        )
        .unwrap();
    store
        .insert_all(
            "MyopicEfficiency",
            vec![
                myopic("IMP", "ethos", "oil", 2020, 40),
                myopic("PP", "oil", "elc", 2020, 30),
                myopic("HEATER", "elc", "heat", 2020, 20),
                myopic("GASPROD", "ethos", "gas", 2020, 30),
                myopic("RETIRED", "ethos", "oil", 2000, 10),
            ],
        )
        .unwrap();
    store
        .insert_all(
            "technologies",
            vec![
                vec![t("IMP"), t("r")],
                vec![t("PP"), t("p")],
                vec![t("HEATER"), t("pb")],
                vec![t("GASPROD"), t("p")],
            ],
        )
        .unwrap();
    store
        .insert_all(
            "time_periods",
            vec![
                vec![i(2010), t("e")],
                vec![i(2020), t("f")],
                vec![i(2025), t("f")],
                vec![i(2030), t("f")],
            ],
        )
        .unwrap();
    store
}

fn window() -> TimeWindow {
    TimeWindow::new(2020, 2030, 2025).unwrap()
}

fn viable(store: &MemoryStore) -> ViabilitySet {
    refresh_viability(store, &window()).unwrap()
}

fn project(store: &MemoryStore, viable: &ViabilitySet, name: &str) -> Option<ParameterProjection> {
    let projector = TableProjector::new(
        store,
        ProjectionMode::Windowed {
            window: window(),
            viability: viable,
        },
    );
    projector.project(lookup(name).unwrap()).unwrap()
}

#[test]
fn closure_drops_the_unconsumed_producer() {
    let store = fixture();
    let viable = viable(&store);
    let techs: Vec<&str> = viable.technologies().iter().map(|t| t.as_str()).collect();
    assert_eq!(techs, vec!["HEATER", "IMP", "PP"]);
    assert_eq!(viable.suppressed().len(), 1);
}

#[test]
fn process_validated_param_keeps_only_viable_triples() {
    let mut store = fixture();
    store
        .insert_all(
            "CostInvest",
            vec![
                vec![t("R1"), t("PP"), i(2020), Value::real(1000.0)],
                vec![t("R1"), t("GASPROD"), i(2020), Value::real(500.0)],
                vec![t("R1"), t("PP"), i(2015), Value::real(900.0)],
            ],
        )
        .unwrap();
    let viable = viable(&store);
    let projected = project(&store, &viable, "CostInvest").unwrap();
    let map = projected.as_param().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(
        map.get(&vec![t("R1"), t("PP"), i(2020)]),
        Some(&Value::real(1000.0))
    );
}

#[test]
fn demand_is_bounded_by_the_demand_horizon() {
    let mut store = fixture();
    store
        .insert_all(
            "Demand",
            vec![
                vec![t("R1"), i(2020), t("heat"), Value::real(10.0)],
                vec![t("R1"), i(2025), t("heat"), Value::real(12.0)],
                vec![t("R1"), i(2030), t("heat"), Value::real(14.0)],
            ],
        )
        .unwrap();
    let viable = viable(&store);
    let projected = project(&store, &viable, "Demand").unwrap();
    assert_eq!(projected.len(), 2);
}

#[test]
fn time_sets_follow_the_window() {
    let store = fixture();
    let viable = viable(&store);
    let exist = project(&store, &viable, "time_exist").unwrap();
    assert_eq!(exist.as_set().unwrap(), &[i(2010)]);
    let future = project(&store, &viable, "time_future").unwrap();
    assert_eq!(future.as_set().unwrap(), &[i(2020), i(2025), i(2030)]);
}

#[test]
fn technology_sets_are_validated() {
    let store = fixture();
    let viable = viable(&store);
    let production = project(&store, &viable, "tech_production").unwrap();
    // GASPROD carries flag 'p' but is not viable
    assert_eq!(production.as_set().unwrap(), &[t("PP"), t("HEATER")]);
    let physical = project(&store, &viable, "commodity_physical").unwrap();
    assert_eq!(
        physical.as_set().unwrap(),
        &[t("ethos"), t("oil"), t("elc")]
    );
}

#[test]
fn empty_table_is_sparse_but_filtered_table_is_not() {
    let mut store = fixture();
    let viable = viable(&store);
    assert!(project(&store, &viable, "MaxResource").is_none());

    store
        .insert(
            "MaxResource",
            vec![t("R1"), t("GASPROD"), Value::real(5.0)],
        )
        .unwrap();
    let projected = project(&store, &viable, "MaxResource").unwrap();
    assert!(projected.is_empty());
}

#[test]
fn storage_duration_checks_the_tech_column() {
    let mut store = fixture();
    store
        .insert_all(
            "StorageDuration",
            vec![
                vec![t("R1"), t("PP"), i(8)],
                vec![t("R1"), t("GASPROD"), i(4)],
            ],
        )
        .unwrap();
    let viable = viable(&store);
    let projected = project(&store, &viable, "StorageDuration").unwrap();
    assert_eq!(projected.len(), 1);
}

#[test]
fn emission_activity_checks_each_column() {
    let mut store = fixture();
    let row = |i_c: &str, tech: &str, v: i64, o_c: &str| {
        vec![t("R1"), t("co2"), t(i_c), t(tech), i(v), t(o_c), Value::real(0.1)]
    };
    store
        .insert_all(
            "EmissionActivity",
            vec![
                row("oil", "PP", 2020, "elc"),
                // region groups are fine here
                vec![t("R1+R2"), t("co2"), t("oil"), t("PP"), i(2020), t("elc"), Value::real(0.2)],
                row("ethos", "GASPROD", 2020, "gas"),
                row("oil", "PP", 2040, "elc"),
            ],
        )
        .unwrap();
    let viable = viable(&store);
    let projected = project(&store, &viable, "EmissionActivity").unwrap();
    assert_eq!(projected.len(), 2);
}

#[test]
fn region_groups_in_process_params_are_not_fatal() {
    let mut store = fixture();
    store
        .insert_all(
            "ExistingCapacity",
            vec![
                vec![t("R1"), t("PP"), i(2020), Value::real(3.0)],
                vec![t("R1+R2"), t("PP"), i(2020), Value::real(4.0)],
            ],
        )
        .unwrap();
    let viable = viable(&store);
    let projected = project(&store, &viable, "ExistingCapacity").unwrap();
    assert_eq!(projected.len(), 1);
}

#[test]
fn later_rows_overwrite_earlier_values() {
    let mut store = fixture();
    store
        .insert_all(
            "MyopicCapacity",
            vec![vec![t("R1"), t("PP"), i(2020), Value::real(1.0)]],
        )
        .unwrap();
    store
        .insert_all(
            "ExistingCapacity",
            vec![vec![t("R1"), t("PP"), i(2020), Value::real(2.0)]],
        )
        .unwrap();
    let viable = viable(&store);
    let projected = project(&store, &viable, "ExistingCapacity").unwrap();
    let map = projected.as_param().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map[0], Value::real(2.0));
}

#[test]
fn scalar_parameter_keeps_its_first_row() {
    let mut store = fixture();
    store
        .insert_all(
            "GlobalDiscountRate",
            vec![vec![Value::real(0.05)], vec![Value::real(0.07)]],
        )
        .unwrap();
    let viable = viable(&store);
    let projected = project(&store, &viable, "GlobalDiscountRate").unwrap();
    let map = projected.as_param().unwrap();
    assert_eq!(map.len(), 1);
    assert!(map.keys().all(Vec::is_empty));
    assert_eq!(map[0], Value::real(0.05));
}

#[test]
fn windowed_efficiency_is_the_canonical_edge_set() {
    let store = fixture();
    let viable = viable(&store);
    let projected = project(&store, &viable, "Efficiency").unwrap();
    let keys: Vec<&Value> = projected.as_param().unwrap().keys().map(|k| &k[2]).collect();
    // sorted by region then input commodity: elc, ethos, oil
    assert_eq!(keys, vec![&t("HEATER"), &t("IMP"), &t("PP")]);
}

#[test]
fn full_horizon_skips_validation_and_cleans_efficiency() {
    let mut store = fixture();
    store
        .insert_all(
            "Efficiency",
            vec![
                vec![t("R1"), t("ethos"), t("IMP"), i(2020), t("oil"), Value::real(1.0)],
                vec![t("R1"), t("oil"), t("PP"), i(2020), t("elc"), Value::real(0.4)],
                vec![t("R1"), t("ethos"), t("GASPROD"), i(2020), t("gas"), Value::real(1.0)],
            ],
        )
        .unwrap();
    let projector = TableProjector::new(&store, ProjectionMode::FullHorizon);

    let efficiency = projector.project(lookup("Efficiency").unwrap()).unwrap().unwrap();
    // elc and gas have no consumer in the whole table
    assert_eq!(efficiency.len(), 1);

    let production = projector
        .project(lookup("tech_production").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(production.len(), 3);

    let exist = projector.project(lookup("time_exist").unwrap()).unwrap().unwrap();
    assert_eq!(exist.as_set().unwrap(), &[i(2010)]);
}

#[test]
fn optional_tables_may_be_absent() {
    let mut store = MemoryStore::new();
    store.declare("tech_reserve", &["tech"]).unwrap();
    let projector = TableProjector::new(&store, ProjectionMode::FullHorizon);
    assert!(projector.project(lookup("tech_ramping").unwrap()).unwrap().is_none());
    assert!(projector.project(lookup("tech_reserve").unwrap()).unwrap().is_none());
}

#[test]
fn missing_required_table_is_a_store_error() {
    let store = MemoryStore::new();
    let projector = TableProjector::new(&store, ProjectionMode::FullHorizon);
    let err = projector.project(lookup("regions").unwrap()).unwrap_err();
    assert!(matches!(err, HzError::Store { .. }));
}

#[test]
fn multi_column_set_is_a_schema_error() {
    const QUERY: &[TableQuery] = &[TableQuery::new("regions", &["regions", "notes"])];
    let mut store = MemoryStore::new();
    store.declare("regions", &["regions", "notes"]).unwrap();
    store.insert("regions", vec![t("R1"), Value::Null]).unwrap();
    let projector = TableProjector::new(&store, ProjectionMode::FullHorizon);
    let err = projector
        .project(&ParamSpec::set("regions", Source::Tables(QUERY)))
        .unwrap_err();
    assert!(matches!(err, HzError::Schema { .. }));
}

#[test]
fn region_group_indices_are_sorted_and_distinct() {
    let mut store = fixture();
    store
        .insert_all(
            "MinActivity",
            vec![
                vec![t("R2"), i(2020), t("PP"), Value::real(1.0)],
                vec![t("R1+R2"), i(2020), t("PP"), Value::real(1.0)],
            ],
        )
        .unwrap();
    store
        .insert_all(
            "EmissionLimit",
            vec![vec![t("R1"), i(2020), t("co2"), Value::real(1.0)]],
        )
        .unwrap();
    let viable = viable(&store);
    let groups = project(&store, &viable, "RegionalGlobalIndices").unwrap();
    assert_eq!(groups.as_set().unwrap(), &[t("R1"), t("R1+R2"), t("R2")]);
}
