//! Query helpers for stored trajectories.

use msd_plot::Series;
use msd_results::TrajectoryRecord;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub record_count: usize,
    pub x_range: (f64, f64),
    pub final_x: f64,
    pub final_v: f64,
}

pub fn get_run_summary(records: &[TrajectoryRecord]) -> AppResult<RunSummary> {
    let (first, last) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(AppError::InvalidInput("No records in run".to_string())),
    };

    let x_range = records
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r.x), hi.max(r.x))
        });

    Ok(RunSummary {
        time_range: (first.time_s, last.time_s),
        record_count: records.len(),
        x_range,
        final_x: last.x,
        final_v: last.v,
    })
}

/// Position-vs-time series for plotting.
pub fn position_series(records: &[TrajectoryRecord], label: Option<String>) -> Series {
    Series::new(
        label,
        records.iter().map(|r| r.time_s).collect(),
        records.iter().map(|r| r.x).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<TrajectoryRecord> {
        vec![
            TrajectoryRecord {
                time_s: 0.0,
                x: 0.0,
                v: 1.0,
            },
            TrajectoryRecord {
                time_s: 1.0,
                x: 0.8,
                v: 0.5,
            },
            TrajectoryRecord {
                time_s: 2.0,
                x: -0.2,
                v: -0.9,
            },
        ]
    }

    #[test]
    fn summary() {
        let s = get_run_summary(&records()).unwrap();
        assert_eq!(s.time_range, (0.0, 2.0));
        assert_eq!(s.record_count, 3);
        assert_eq!(s.x_range, (-0.2, 0.8));
        assert_eq!((s.final_x, s.final_v), (-0.2, -0.9));
    }

    #[test]
    fn empty_run_has_no_summary() {
        assert!(matches!(
            get_run_summary(&[]),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn series_uses_positions() {
        let s = position_series(&records(), None);
        assert_eq!(s.t, vec![0.0, 1.0, 2.0]);
        assert_eq!(s.x, vec![0.0, 0.8, -0.2]);
    }
}
