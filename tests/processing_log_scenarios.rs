use catalog_core::chart::{ChartBuilder, ChartKind};
use catalog_core::display::format_trace;
use catalog_core::meta::{License, Source, VariableMeta};
use catalog_core::processing_log::{with_processing_log, LogEntry, ProcessingLog};
use catalog_core::table::{concat, JoinHow};
use catalog_core::variable::Reduction;
use catalog_core::{
    disable_processing_log, enable_processing_log, is_processing_log_enabled, preprocess_log, target_hash,
    CatalogConfig, Series, Table, Variable,
};
use std::collections::HashSet;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn seeded(name: &str, values: Vec<i64>) -> Variable {
    let mut var = Variable::new(name, values);
    var.metadata.processing_log = ProcessingLog::from_entries(vec![LogEntry::create(name)]);
    var
}

/// a + b stored as column c of a table.
fn scenario() -> Table {
    let a = seeded("a", vec![1, 2]);
    let b = seeded("b", vec![3, 4]);
    let mut t = Table::new();
    t.insert("c", a.add(&b).unwrap()).unwrap();
    t
}

#[test]
fn test_end_to_end_add_and_assign() {
    init();
    let _guard = enable_processing_log();

    let t = scenario();
    let c = t.get("c").unwrap();

    assert_eq!(c.values, Series::Int(vec![4, 6]));
    let expected = ProcessingLog::from_entries(vec![
        LogEntry::create("a"),
        LogEntry::create("b"),
        LogEntry::new("a", ["a", "b"], "+", "a#2fde09cd0a"),
        LogEntry::new("c", ["a#2fde09cd0a"], "rename", "c#a6d702bdaf"),
    ]);
    assert_eq!(c.metadata.processing_log, expected);
    assert_eq!(c.target(), "c#a6d702bdaf");
}

#[test]
fn test_targets_are_content_hashes() {
    assert_eq!(target_hash("+", &["a", "b"]), "2fde09cd0a");
    assert_eq!(target_hash("rename", &["a#2fde09cd0a"]), "a6d702bdaf");
    // Deterministic across calls, sensitive to parent order.
    assert_eq!(target_hash("+", &["a", "b"]), target_hash("+", &["a", "b"]));
    assert_ne!(target_hash("+", &["a", "b"]), target_hash("+", &["b", "a"]));
}

#[test]
fn test_operands_are_not_mutated() {
    let _guard = enable_processing_log();
    let a = seeded("a", vec![1, 2]).with_metadata(VariableMeta::new().with_source(Source::new("UN")));
    let b = seeded("b", vec![3, 4]);
    let before = (a.clone(), b.clone());

    let _ = a.add(&b).unwrap().rename("c");
    let _ = a.mul(2.0).unwrap();

    assert_eq!((a, b), before);
}

#[test]
fn test_logging_is_off_by_default_and_scoped() {
    assert!(!is_processing_log_enabled());
    let a = seeded("a", vec![1]);
    let b = seeded("b", vec![2]);

    assert!(a.add(&b).unwrap().metadata.processing_log.is_empty());

    {
        let _outer = enable_processing_log();
        assert_eq!(a.add(&b).unwrap().metadata.processing_log.len(), 3);
        {
            let _inner = disable_processing_log();
            assert!(a.add(&b).unwrap().metadata.processing_log.is_empty());
        }
        assert!(is_processing_log_enabled());
    }
    assert!(!is_processing_log_enabled());

    let logged = with_processing_log(|| a.sub(&b).unwrap());
    assert_eq!(logged.metadata.processing_log.last().unwrap().operation, "-");
    assert!(!is_processing_log_enabled());
}

#[test]
fn test_metadata_propagates_without_logging() {
    let a = Variable::new("a", vec![1.0]).with_metadata(
        VariableMeta::new().with_unit("kg").with_source(Source::new("UN")).with_license(License::new("CC BY")),
    );
    let b = Variable::new("b", vec![2.0])
        .with_metadata(VariableMeta::new().with_unit("kg").with_source(Source::new("WDI")).with_source(Source::new("UN")));

    let c = a.add(&b).unwrap();

    assert_eq!(c.metadata.unit.as_deref(), Some("kg"));
    let names: Vec<_> = c.metadata.sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["UN", "WDI"]);
    assert_eq!(c.metadata.licenses.len(), 1);
    assert!(c.metadata.processing_log.is_empty());
}

#[test]
fn test_logs_hold_no_duplicates_after_chained_operations() {
    let _guard = enable_processing_log();
    let a = seeded("a", vec![1, 2]);
    let b = seeded("b", vec![3, 4]);

    let x = a.add(&b).unwrap().rename("x");
    let y = x.mul(&a).unwrap().sub(&b).unwrap().rename("y");

    let entries = y.metadata.processing_log.entries();
    let unique: HashSet<_> = entries.iter().collect();
    assert_eq!(unique.len(), entries.len());
    assert_eq!(entries.iter().filter(|e| e.operation == "create").count(), 2);
}

#[test]
fn test_repeated_runs_produce_identical_logs() {
    let first = with_processing_log(scenario);
    let second = with_processing_log(scenario);
    assert_eq!(first.get("c").unwrap().metadata, second.get("c").unwrap().metadata);
}

#[test]
fn test_log_dict_round_trip() {
    let _guard = enable_processing_log();
    let t = scenario();
    let log = &t.get("c").unwrap().metadata.processing_log;

    let dicts = log.as_dict();
    assert!(dicts[0].get("parents").is_none());
    assert_eq!(dicts[2]["parents"][1], "b");

    assert_eq!(&ProcessingLog::from_dict(&dicts).unwrap(), log);
    assert_eq!(&ProcessingLog::from_json(&log.to_json()).unwrap(), log);
}

#[test]
fn test_squeezed_scenario() {
    let _guard = enable_processing_log();
    let t = scenario();

    let squeezed = preprocess_log(&t.get("c").unwrap().metadata.processing_log);

    let expected = ProcessingLog::from_entries(vec![
        LogEntry::create("a"),
        LogEntry::create("b"),
        LogEntry::new("c", ["a", "b"], "+", "c#a6d702bdaf"),
    ]);
    assert_eq!(squeezed, expected);
}

#[test]
fn test_lineage_and_trace_of_scenario() {
    let _guard = enable_processing_log();
    let t = scenario();
    let log = &t.get("c").unwrap().metadata.processing_log;

    let lineage = log.lineage().unwrap();
    assert_eq!(lineage.parents("c#a6d702bdaf"), vec!["a#2fde09cd0a"]);
    assert_eq!(lineage.ancestors("c#a6d702bdaf").len(), 3);
    assert_eq!(lineage.roots(), vec!["a", "b"]);

    let trace = format_trace(log, "c#a6d702bdaf");
    assert!(trace.starts_with("LINEAGE TRACE for 'c#a6d702bdaf':"));
    assert!(trace.contains("a#2fde09cd0a = a + b"));
}

#[test]
fn test_table_pipeline_keeps_sources_and_logs() {
    let _guard = enable_processing_log();
    let mut gdp = Table::from_columns([
        ("country", Series::from(vec!["FR", "DE"])),
        ("gdp", Series::from(vec![10.0, 20.0])),
    ])
    .unwrap();
    gdp.get_mut("gdp").unwrap().metadata = VariableMeta::new().with_source(Source::new("WDI"));
    let mut pop = Table::from_columns([
        ("country", Series::from(vec!["DE", "FR"])),
        ("pop", Series::from(vec![80.0, 60.0])),
    ])
    .unwrap();
    pop.get_mut("pop").unwrap().metadata = VariableMeta::new().with_source(Source::new("UN"));

    let mut merged = gdp.merge(&pop, &["country"], JoinHow::Inner).unwrap();
    let per_capita = merged.get("gdp").unwrap().div(merged.get("pop").unwrap()).unwrap();
    merged.insert("gdp_per_capita", per_capita).unwrap();

    let col = merged.get("gdp_per_capita").unwrap();
    let names: Vec<_> = col.metadata.sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["WDI", "UN"]);
    assert_eq!(col.metadata.processing_log.last().unwrap().operation, "rename");
    assert!(col.target().starts_with("gdp_per_capita#"));

    let stacked = concat(&[&merged, &merged]).unwrap();
    assert_eq!(stacked.n_rows(), 4);

    let totals = stacked.groupby(&["country"]).unwrap().agg(Reduction::Sum).unwrap();
    assert_eq!(totals.n_rows(), 2);
    assert_eq!(totals.get("gdp").unwrap().metadata.sources, vec![Source::new("WDI")]);
}

#[test]
fn test_environment_config_drives_logging_and_charts() {
    // No other test in this binary reads these variables.
    std::env::set_var("PROCESSING_LOG", "1");
    std::env::set_var("CATALOG_MAX_CHART_ENTITIES", "1");
    let config = CatalogConfig::from_env();
    std::env::remove_var("PROCESSING_LOG");
    std::env::remove_var("CATALOG_MAX_CHART_ENTITIES");

    let t = {
        let _scope = config.processing_log_scope();
        scenario()
    };
    assert_eq!(t.get("c").unwrap().metadata.processing_log.len(), 4);
    assert!(!is_processing_log_enabled());

    let table = Table::from_columns([
        ("country", Series::from(vec!["FR", "DE"])),
        ("year", Series::from(vec![2000i64, 2000])),
        ("gdp", Series::from(vec![1.0, 2.0])),
    ])
    .unwrap();
    let spec = ChartBuilder::from_config(&table, ChartKind::Bar, &config).y("gdp").build().unwrap();
    assert_eq!(spec.entities, vec!["DE".to_string()]);
}
