//! Service-layer runs against scenario files in a scratch directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use msd_app::{
    AppError, RunOptions, RunRequest, RunStage, ensure_run, ensure_run_with_progress,
    export_run_csv, get_run_summary, list_runs, load_run, run_sweep_scenario, save_scenario,
};
use msd_project::builtin;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn write_builtin(dir: &Path, name: &str, t_end: f64) -> PathBuf {
    let mut scenario = builtin(name).unwrap();
    scenario.time.t_end = scenario.time.t0 + t_end;
    let path = dir.join(format!("{name}.yaml"));
    save_scenario(&path, &scenario).unwrap();
    path
}

#[test]
fn second_run_comes_from_cache() {
    let dir = unique_temp_dir("msd_app_cache");
    let path = write_builtin(&dir, "baseline", 20.0);

    let request = RunRequest {
        scenario_path: &path,
        options: RunOptions::default(),
    };

    let mut stages = Vec::new();
    let first = ensure_run_with_progress(&request, Some(&mut |e| stages.push(e.stage)))
        .expect("first run failed");
    assert!(!first.loaded_from_cache);
    assert!(first.manifest.stats.success);
    assert!(stages.contains(&RunStage::Integrating));
    assert_eq!(stages.last(), Some(&RunStage::Completed));

    let second = ensure_run(&request).expect("second run failed");
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);
    assert_eq!(second.records, first.records);

    let runs = list_runs(&path).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].scenario_name, "baseline");

    let (_, records) = load_run(&path, &first.run_id).unwrap();
    let summary = get_run_summary(&records).unwrap();
    assert_eq!(summary.time_range, (0.0, 20.0));

    let csv = dir.join("baseline.csv");
    let rows = export_run_csv(&path, &first.run_id, &csv).unwrap();
    assert_eq!(rows, records.len());
    assert!(fs::read_to_string(&csv).unwrap().starts_with("time_s,x,v\n"));
}

#[test]
fn no_cache_reruns() {
    let dir = unique_temp_dir("msd_app_nocache");
    let path = write_builtin(&dir, "baseline", 5.0);

    ensure_run(&RunRequest {
        scenario_path: &path,
        options: RunOptions::default(),
    })
    .unwrap();

    let rerun = ensure_run(&RunRequest {
        scenario_path: &path,
        options: RunOptions {
            use_cache: false,
            ..RunOptions::default()
        },
    })
    .unwrap();
    assert!(!rerun.loaded_from_cache);
}

#[test]
fn unknown_run_id() {
    let dir = unique_temp_dir("msd_app_missing");
    let path = write_builtin(&dir, "baseline", 1.0);
    assert!(matches!(
        load_run(&path, "nope"),
        Err(AppError::RunNotFound(_))
    ));
}

#[test]
fn sweep_points_in_order_and_cached() {
    let dir = unique_temp_dir("msd_app_sweep");
    let path = write_builtin(&dir, "stiffening", 10.0);

    let response = run_sweep_scenario(&path, &RunOptions::default()).unwrap();
    let values: Vec<f64> = response.points.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1.0, 3.0, 5.0, 7.0]);
    assert_eq!(response.points[1].label, "Power = 3");
    assert!(response.points.iter().all(|p| !p.loaded_from_cache));
    assert!(response.points.iter().all(|p| p.manifest.stats.success));

    let again = run_sweep_scenario(&path, &RunOptions::default()).unwrap();
    assert!(again.points.iter().all(|p| p.loaded_from_cache));
    for (a, b) in response.points.iter().zip(&again.points) {
        assert_eq!(a.run_id, b.run_id);
        assert_eq!(a.records, b.records);
    }
}

#[test]
fn sweep_requires_sweep_section() {
    let dir = unique_temp_dir("msd_app_nosweep");
    let path = write_builtin(&dir, "baseline", 1.0);
    assert!(matches!(
        run_sweep_scenario(&path, &RunOptions::default()),
        Err(AppError::InvalidInput(_))
    ));
}
