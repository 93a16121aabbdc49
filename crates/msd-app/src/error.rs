//! Error types for the msd-app service layer.

use std::path::PathBuf;

/// Unified error for every frontend operation.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Project(String),

    #[error("Failed to read scenario file: {path}")]
    ScenarioFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<msd_project::ProjectError> for AppError {
    fn from(err: msd_project::ProjectError) -> Self {
        match err {
            msd_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<msd_project::ValidationError> for AppError {
    fn from(err: msd_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<msd_sim::SimError> for AppError {
    fn from(err: msd_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<msd_results::ResultsError> for AppError {
    fn from(err: msd_results::ResultsError) -> Self {
        match err {
            msd_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}

impl From<msd_plot::PlotError> for AppError {
    fn from(err: msd_plot::PlotError) -> Self {
        AppError::Plot(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_keep_their_kind() {
        let err: AppError = msd_project::ProjectError::Validation(
            msd_project::ValidationError::UnsupportedVersion { version: 9 },
        )
        .into();
        assert!(matches!(err, AppError::Validation(_)));

        let err: AppError = msd_results::ResultsError::RunNotFound {
            run_id: "abc".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::RunNotFound(id) if id == "abc"));
    }
}
