//! Result data types.

use chrono::{SecondsFormat, Utc};
use msd_model::State;
use msd_sim::{IntegratorType, SimRecord, SimStats};
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_name: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    pub run_type: RunType,
    pub integrator: IntegratorType,
    pub t0: f64,
    pub t_end: f64,
    pub solver_version: String,
    pub stats: SimStats,
}

impl RunManifest {
    /// Manifest stamped with the current time.
    pub fn new(
        run_id: RunId,
        scenario_name: impl Into<String>,
        run_type: RunType,
        integrator: IntegratorType,
        record: &SimRecord<State>,
        solver_version: impl Into<String>,
    ) -> Self {
        Self {
            run_id,
            scenario_name: scenario_name.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            run_type,
            integrator,
            t0: record.t.first().copied().unwrap_or_default(),
            t_end: record.t.last().copied().unwrap_or_default(),
            solver_version: solver_version.into(),
            stats: record.stats.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RunType {
    Single,
    SweepPoint { parameter: String, value: f64 },
}

/// One trajectory sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryRecord {
    pub time_s: f64,
    pub x: f64,
    pub v: f64,
}

impl TrajectoryRecord {
    pub fn state(&self) -> State {
        State::new(self.x, self.v)
    }
}

pub fn records_from_sim(record: &SimRecord<State>) -> Vec<TrajectoryRecord> {
    record
        .t
        .iter()
        .zip(&record.x)
        .map(|(&time_s, s)| TrajectoryRecord {
            time_s,
            x: s.x,
            v: s.v,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use msd_sim::SimStatus;

    fn record() -> SimRecord<State> {
        SimRecord {
            t: vec![0.0, 0.5, 1.0],
            x: vec![State::new(0.0, 1.0), State::new(0.4, 0.8), State::new(0.7, 0.2)],
            stats: SimStats {
                status: SimStatus::Finished,
                success: true,
                steps: 2,
                rejected: 0,
                rhs_evals: 14,
                message: "reached t_end".to_string(),
            },
        }
    }

    #[test]
    fn records_follow_samples() {
        let recs = records_from_sim(&record());
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[1].time_s, 0.5);
        assert_eq!(recs[2].state(), State::new(0.7, 0.2));
    }

    #[test]
    fn manifest_span_and_timestamp() {
        let manifest = RunManifest::new(
            "abc".to_string(),
            "baseline",
            RunType::Single,
            IntegratorType::DormandPrince45,
            &record(),
            "0.1.0",
        );
        assert_eq!(manifest.t0, 0.0);
        assert_eq!(manifest.t_end, 1.0);
        assert!(chrono::DateTime::parse_from_rfc3339(&manifest.timestamp).is_ok());
    }
}
