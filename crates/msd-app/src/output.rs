//! CSV and plot files for finished runs.

use std::path::{Path, PathBuf};

use msd_plot::{PlotConfig, Series, plot_series};
use msd_results::{TrajectoryRecord, export_csv};

use crate::error::AppResult;

/// Paths in a scenario's `output` section are relative to the scenario file.
pub fn resolve_output_path(scenario_path: &Path, output: &str) -> PathBuf {
    let output = Path::new(output);
    if output.is_absolute() {
        return output.to_path_buf();
    }
    match scenario_path.parent() {
        Some(dir) => dir.join(output),
        None => output.to_path_buf(),
    }
}

pub fn write_csv(path: &Path, records: &[TrajectoryRecord]) -> AppResult<()> {
    export_csv(records, path)?;
    Ok(())
}

pub fn write_plot(path: &Path, series: &[Series], title: Option<&str>) -> AppResult<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)?;
    }
    let config = match title {
        Some(title) => PlotConfig::with_title(title),
        None => PlotConfig::default(),
    };
    plot_series(series, path, Some(&config))?;
    Ok(())
}
