//! Content-based hashing for run IDs.

use msd_project::Scenario;
use sha2::{Digest, Sha256};

use crate::ResultsResult;
use crate::types::RunType;

/// SHA-256 over the scenario, the run type and the solver version.
///
/// Output and sweep sections do not affect the trajectory and are left out, so
/// changing a plot path reuses cached runs. Fails only if the scenario
/// cannot be serialized.
pub fn compute_run_id(
    scenario: &Scenario,
    run_type: &RunType,
    solver_version: &str,
) -> ResultsResult<String> {
    let mut hasher = Sha256::new();

    let mut hashed = scenario.clone();
    hashed.output = None;
    hashed.sweep = None;
    hashed.description = None;

    let scenario_json = serde_json::to_string(&hashed)?;
    hasher.update(scenario_json.as_bytes());

    let run_type_json = serde_json::to_string(run_type)?;
    hasher.update(run_type_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}
