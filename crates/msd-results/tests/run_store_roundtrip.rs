use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use msd_model::{Msd, State};
use msd_project::builtin;
use msd_results::{
    ResultsError, RunManifest, RunStore, RunType, compute_run_id, export_csv, records_from_sim,
};
use msd_sim::{IntegratorType, MsdSystem, SimOptions, run_sim};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

#[test]
fn save_list_load_roundtrip() {
    let scenario_dir = unique_temp_dir("msd_results_scenario");
    fs::create_dir_all(&scenario_dir).expect("failed to create temp scenario dir");
    let scenario_path = scenario_dir.join("baseline.yaml");
    fs::write(&scenario_path, "version: 1\nname: baseline\n").expect("failed to write scenario");

    let store = RunStore::for_scenario(&scenario_path).expect("failed to create run store");
    assert!(store.root_dir().ends_with(".msdflow/runs"));

    let scenario = builtin("baseline").unwrap();
    let run_id = compute_run_id(&scenario, &RunType::Single, "0.1.0").unwrap();
    assert!(!store.has_run(&run_id));

    let record = run_sim(
        &MsdSystem::new(Msd::default()),
        0.0,
        10.0,
        State::new(0.0, 1.0),
        &SimOptions::default(),
    )
    .unwrap();
    let records = records_from_sim(&record);
    let manifest = RunManifest::new(
        run_id.clone(),
        "baseline",
        RunType::Single,
        IntegratorType::DormandPrince45,
        &record,
        "0.1.0",
    );

    store
        .save_run(&manifest, &records)
        .expect("failed to save run");
    assert!(store.has_run(&run_id));

    let runs = store.list_runs("baseline").expect("failed to list runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, run_id);
    assert!(store.list_runs("bellow").unwrap().is_empty());

    let loaded_manifest = store.load_manifest(&run_id).expect("failed to load manifest");
    assert_eq!(loaded_manifest, manifest);

    let loaded = store.load_trajectory(&run_id).expect("failed to load records");
    assert_eq!(loaded, records);

    let csv_path = scenario_dir.join("out").join("baseline.csv");
    export_csv(&loaded, &csv_path).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), records.len() + 1);
    assert!(csv.starts_with("time_s,x,v\n0,0,1\n"));

    store.delete_run(&run_id).unwrap();
    assert!(!store.has_run(&run_id));
    assert!(matches!(
        store.load_manifest(&run_id),
        Err(ResultsError::RunNotFound { .. })
    ));
}
