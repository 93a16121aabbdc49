//! Shared application service layer for msdflow.
//!
//! Centralizes scenario handling, cached single runs, parameter sweeps, run
//! queries and output writing so the CLI stays a thin shell.

pub mod error;
pub mod output;
pub mod progress;
pub mod query;
pub mod run_service;
pub mod scenario_service;
pub mod sweep_service;

pub use error::{AppError, AppResult};
pub use output::{resolve_output_path, write_csv, write_plot};
pub use progress::{RunProgressEvent, RunStage};
pub use query::{RunSummary, get_run_summary, position_series};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, ensure_run, ensure_run_with_progress,
    export_run_csv, list_runs, load_run,
};
pub use scenario_service::{
    ScenarioSummary, load_scenario, save_scenario, summarize_scenario, write_builtin,
};
pub use sweep_service::{SweepResponse, SweepRunPoint, run_sweep_scenario};
