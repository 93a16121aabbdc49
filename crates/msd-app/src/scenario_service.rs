//! Scenario loading, saving and introspection.

use std::path::Path;

use msd_project::{ProjectError, Scenario, SweepParameter};
use msd_sim::IntegratorType;

use crate::error::{AppError, AppResult};

/// Headline facts about a scenario, for listing and `validate` output.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSummary {
    pub name: String,
    pub description: Option<String>,
    pub momentum: bool,
    pub mass_guard: bool,
    pub t0: f64,
    pub t_end: f64,
    pub method: IntegratorType,
    pub sweep: Option<(SweepParameter, usize)>,
}

/// Load and validate a scenario (`.json` as JSON, anything else as YAML).
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    msd_project::load_scenario(path).map_err(|e| match e {
        ProjectError::Io(source) => AppError::ScenarioFileRead {
            path: path.to_path_buf(),
            source,
        },
        other => other.into(),
    })
}

pub fn save_scenario(path: &Path, scenario: &Scenario) -> AppResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => msd_project::save_json(path, scenario)?,
        _ => msd_project::save_yaml(path, scenario)?,
    }
    tracing::info!(path = %path.display(), name = %scenario.name, "saved scenario");
    Ok(())
}

/// Write the named built-in scenario to `path`.
pub fn write_builtin(name: &str, path: &Path) -> AppResult<Scenario> {
    let scenario = msd_project::builtin(name)?;
    save_scenario(path, &scenario)?;
    Ok(scenario)
}

pub fn summarize_scenario(scenario: &Scenario) -> ScenarioSummary {
    ScenarioSummary {
        name: scenario.name.clone(),
        description: scenario.description.clone(),
        momentum: scenario.model.mass_rate.is_some(),
        mass_guard: scenario.model.mass_guard,
        t0: scenario.time.t0,
        t_end: scenario.time.t_end,
        method: scenario.solver.method,
        sweep: scenario
            .sweep
            .as_ref()
            .map(|s| (s.parameter, s.points().len())),
    }
}
