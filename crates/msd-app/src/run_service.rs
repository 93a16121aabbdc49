//! Single-run execution and caching service.

use std::path::Path;

use msd_core::Timer;
use msd_project::build_scenario;
use msd_results::{
    RunManifest, RunStore, RunType, TrajectoryRecord, compute_run_id, records_from_sim,
};
use msd_sim::{MsdSystem, run_sim};

use crate::error::AppResult;
use crate::output;
use crate::progress::{RunProgressEvent, RunStage};
use crate::scenario_service;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub struct RunRequest<'a> {
    pub scenario_path: &'a Path,
    pub options: RunOptions,
}

#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub build_time_s: f64,
    pub solve_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub records: Vec<TrajectoryRecord>,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: &Timer,
    message: &str,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::new(
            stage,
            started.elapsed_s(),
            Some(message.to_string()),
        ));
    }
}

/// Execute the scenario, or load it from the run cache.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Timer::start("run");
    let mut timing = RunTimingSummary::default();

    emit_progress(&mut progress_cb, RunStage::LoadingScenario, &started, "Loading scenario");
    let scenario = scenario_service::load_scenario(request.scenario_path)?;

    emit_progress(&mut progress_cb, RunStage::CheckingCache, &started, "Checking run cache");
    let run_id = compute_run_id(&scenario, &RunType::Single, &request.options.solver_version)?;
    let store = RunStore::for_scenario(request.scenario_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            RunStage::LoadingCachedResult,
            &started,
            "Loading cached run",
        );
        let load = Timer::start("load_cache");
        let manifest = store.load_manifest(&run_id)?;
        let records = store.load_trajectory(&run_id)?;
        timing.load_cache_time_s = load.stop();
        timing.total_time_s = started.elapsed_s();

        tracing::info!(%run_id, scenario = %scenario.name, "loaded cached run");
        emit_progress(&mut progress_cb, RunStage::Completed, &started, "Loaded cached run");

        return Ok(RunResponse {
            run_id,
            manifest,
            records,
            loaded_from_cache: true,
            timing,
        });
    }

    emit_progress(&mut progress_cb, RunStage::Building, &started, "Building model");
    let build = Timer::start("build");
    let built = build_scenario(&scenario)?;
    let integrator = built.options.integrator;
    let system = MsdSystem::new(built.dynamics);
    timing.build_time_s = build.stop();

    emit_progress(&mut progress_cb, RunStage::Integrating, &started, "Integrating");
    let solve = Timer::start("solve");
    let record = run_sim(&system, built.t0, built.t_end, built.x0, &built.options)?;
    timing.solve_time_s = solve.stop();

    if !record.success() {
        tracing::warn!(
            scenario = %scenario.name,
            status = ?record.stats.status,
            message = %record.stats.message,
            "run stopped early; keeping partial trajectory"
        );
    }

    emit_progress(&mut progress_cb, RunStage::SavingResults, &started, "Saving results");
    let save = Timer::start("save");
    let records = records_from_sim(&record);
    let manifest = RunManifest::new(
        run_id.clone(),
        scenario.name.clone(),
        RunType::Single,
        integrator,
        &record,
        request.options.solver_version.clone(),
    );
    store.save_run(&manifest, &records)?;
    timing.save_time_s = save.stop();
    timing.total_time_s = started.elapsed_s();

    tracing::info!(
        %run_id,
        scenario = %scenario.name,
        samples = records.len(),
        steps = record.stats.steps,
        solve_s = timing.solve_time_s,
        "run completed"
    );
    emit_progress(&mut progress_cb, RunStage::Completed, &started, "Run completed");

    Ok(RunResponse {
        run_id,
        manifest,
        records,
        loaded_from_cache: false,
        timing,
    })
}

/// Stored runs of the scenario, most recent first.
pub fn list_runs(scenario_path: &Path) -> AppResult<Vec<RunManifest>> {
    let scenario = scenario_service::load_scenario(scenario_path)?;
    let store = RunStore::for_scenario(scenario_path)?;

    let mut runs = store.list_runs(&scenario.name)?;
    runs.reverse();
    Ok(runs)
}

pub fn load_run(
    scenario_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, Vec<TrajectoryRecord>)> {
    let store = RunStore::for_scenario(scenario_path)?;

    let manifest = store.load_manifest(run_id)?;
    let records = store.load_trajectory(run_id)?;

    Ok((manifest, records))
}

/// Write a stored run's trajectory as CSV.
pub fn export_run_csv(scenario_path: &Path, run_id: &str, out: &Path) -> AppResult<usize> {
    let (_manifest, records) = load_run(scenario_path, run_id)?;
    output::write_csv(out, &records)?;
    Ok(records.len())
}
