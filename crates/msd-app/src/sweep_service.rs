//! Parameter sweeps over a scenario, with per-point caching.

use std::path::Path;

use msd_core::Timer;
use msd_project::{SweepParameter, build_scenario, build_sweep_point};
use msd_results::{
    ResultsResult, RunManifest, RunStore, RunType, TrajectoryRecord, compute_run_id,
    records_from_sim,
};
use msd_sim::{SimError, run_sweep_with};

use crate::error::{AppError, AppResult};
use crate::run_service::RunOptions;
use crate::scenario_service;

#[derive(Debug, Clone)]
pub struct SweepRunPoint {
    pub value: f64,
    /// Legend label, e.g. "Power = 3".
    pub label: String,
    pub run_id: String,
    pub manifest: RunManifest,
    pub records: Vec<TrajectoryRecord>,
    pub loaded_from_cache: bool,
}

#[derive(Debug, Clone)]
pub struct SweepResponse {
    pub parameter: SweepParameter,
    /// In sweep value order.
    pub points: Vec<SweepRunPoint>,
    pub total_time_s: f64,
}

fn point_run_type(parameter: SweepParameter, value: f64) -> RunType {
    RunType::SweepPoint {
        parameter: format!("{parameter:?}"),
        value,
    }
}

/// Run every point of the scenario's sweep. Cached points are loaded, the
/// rest run in parallel and are stored.
pub fn run_sweep_scenario(scenario_path: &Path, options: &RunOptions) -> AppResult<SweepResponse> {
    let started = Timer::start("sweep");
    let scenario = scenario_service::load_scenario(scenario_path)?;
    let sweep = scenario.sweep.clone().ok_or_else(|| {
        AppError::InvalidInput(format!("scenario '{}' has no sweep section", scenario.name))
    })?;
    let parameter = sweep.parameter;
    let values = sweep.points();

    let store = RunStore::for_scenario(scenario_path)?;
    let run_ids = values
        .iter()
        .map(|&v| compute_run_id(&scenario, &point_run_type(parameter, v), &options.solver_version))
        .collect::<ResultsResult<Vec<String>>>()?;

    let mut points: Vec<Option<SweepRunPoint>> = Vec::with_capacity(values.len());
    let mut pending = Vec::new();
    for (i, (&value, run_id)) in values.iter().zip(&run_ids).enumerate() {
        if options.use_cache && store.has_run(run_id) {
            points.push(Some(SweepRunPoint {
                value,
                label: format!("{} = {value}", parameter.label()),
                run_id: run_id.clone(),
                manifest: store.load_manifest(run_id)?,
                records: store.load_trajectory(run_id)?,
                loaded_from_cache: true,
            }));
        } else {
            points.push(None);
            pending.push(i);
        }
    }

    tracing::info!(
        scenario = %scenario.name,
        parameter = ?parameter,
        points = values.len(),
        cached = values.len() - pending.len(),
        "running sweep"
    );

    if !pending.is_empty() {
        // Base build validates solver settings shared by every point.
        let base = build_scenario(&scenario)?;
        let pending_values: Vec<f64> = pending.iter().map(|&i| values[i]).collect();
        let results = run_sweep_with(
            &pending_values,
            |value| {
                build_sweep_point(&scenario, parameter, value).map_err(|e| SimError::Backend {
                    message: e.to_string(),
                })
            },
            base.t0,
            base.t_end,
            &base.options,
        )?;

        for (&i, result) in pending.iter().zip(results) {
            let run_id = run_ids[i].clone();
            let records = records_from_sim(&result.record);
            let manifest = RunManifest::new(
                run_id.clone(),
                scenario.name.clone(),
                point_run_type(parameter, result.value),
                base.options.integrator,
                &result.record,
                options.solver_version.clone(),
            );
            store.save_run(&manifest, &records)?;
            points[i] = Some(SweepRunPoint {
                value: result.value,
                label: format!("{} = {}", parameter.label(), result.value),
                run_id,
                manifest,
                records,
                loaded_from_cache: false,
            });
        }
    }

    let points = points.into_iter().flatten().collect();
    Ok(SweepResponse {
        parameter,
        points,
        total_time_s: started.stop(),
    })
}
