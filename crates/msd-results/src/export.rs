//! CSV export of trajectories.

use std::fmt::Write as _;
use std::path::Path;

use crate::ResultsResult;
use crate::types::TrajectoryRecord;

const HEADER: &str = "time_s,x,v";

/// Render records as `time_s,x,v` CSV text.
pub fn write_csv(records: &[TrajectoryRecord]) -> String {
    let mut csv = String::with_capacity(32 * (records.len() + 1));
    csv.push_str(HEADER);
    csv.push('\n');
    for r in records {
        // Writing to a String cannot fail.
        let _ = writeln!(csv, "{},{},{}", r.time_s, r.x, r.v);
    }
    csv
}

pub fn export_csv(records: &[TrajectoryRecord], path: &Path) -> ResultsResult<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, write_csv(records))?;
    tracing::info!(path = %path.display(), rows = records.len(), "exported CSV");
    Ok(())
}
