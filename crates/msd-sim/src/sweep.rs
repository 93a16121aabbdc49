//! Parameter sweeps: one independent simulation per value.
//!
//! Each point gets a freshly built model, so runs share nothing and execute in
//! parallel on the rayon pool. Results come back in input order.

use std::fmt;

use msd_model::{Dynamics, State};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::model::MsdSystem;
use crate::sim::{SimOptions, SimRecord, run_sim};

/// Type of sweep progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SweepType {
    /// Uniformly spaced points
    #[default]
    Linear,
    /// Logarithmically spaced points
    Logarithmic,
}

/// Evenly spaced range of parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepDefinition {
    pub start: f64,
    pub end: f64,
    pub num_points: usize,
    #[serde(default)]
    pub sweep_type: SweepType,
}

impl SweepDefinition {
    pub fn new(start: f64, end: f64, num_points: usize, sweep_type: SweepType) -> SimResult<Self> {
        let def = Self {
            start,
            end,
            num_points,
            sweep_type,
        };
        def.validate()?;
        Ok(def)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(SimError::InvalidArg {
                what: "sweep bounds must be finite",
            });
        }
        if self.num_points < 2 {
            return Err(SimError::InvalidArg {
                what: "sweep must have at least 2 points",
            });
        }
        if (self.start - self.end).abs() < 1e-12 {
            return Err(SimError::InvalidArg {
                what: "sweep start and end must differ",
            });
        }
        if self.sweep_type == SweepType::Logarithmic && (self.start <= 0.0 || self.end <= 0.0) {
            return Err(SimError::InvalidArg {
                what: "logarithmic sweep bounds must be positive",
            });
        }
        Ok(())
    }

    /// Generate all points in the sweep.
    pub fn generate_points(&self) -> Vec<f64> {
        match self.sweep_type {
            SweepType::Linear => self.generate_linear(),
            SweepType::Logarithmic => self.generate_logarithmic(),
        }
    }

    fn generate_linear(&self) -> Vec<f64> {
        if self.num_points <= 1 {
            return vec![self.start];
        }
        let delta = (self.end - self.start) / (self.num_points - 1) as f64;
        let mut points: Vec<f64> = (0..self.num_points)
            .map(|i| self.start + i as f64 * delta)
            .collect();
        // Ensure exact endpoint
        points[self.num_points - 1] = self.end;
        points
    }

    fn generate_logarithmic(&self) -> Vec<f64> {
        if self.num_points <= 1 {
            return vec![self.start];
        }
        if self.start <= 0.0 || self.end <= 0.0 {
            return self.generate_linear();
        }
        let log_start = self.start.ln();
        let log_delta = (self.end.ln() - log_start) / (self.num_points - 1) as f64;
        let mut points: Vec<f64> = (0..self.num_points)
            .map(|i| (log_start + i as f64 * log_delta).exp())
            .collect();
        points[self.num_points - 1] = self.end;
        points
    }
}

impl fmt::Display for SweepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::Logarithmic => write!(f, "Logarithmic"),
        }
    }
}

impl fmt::Display for SweepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sweep from {} to {} ({} points, {})",
            self.start, self.end, self.num_points, self.sweep_type
        )
    }
}

/// Result of one sweep point.
#[derive(Clone, Debug)]
pub struct SweepPoint {
    pub value: f64,
    pub record: SimRecord<State>,
}

/// Run one simulation per value, all starting from `x0`.
pub fn run_sweep<D, F>(
    values: &[f64],
    build_model: F,
    t0: f64,
    t_end: f64,
    x0: State,
    opts: &SimOptions,
) -> SimResult<Vec<SweepPoint>>
where
    D: Dynamics,
    F: Fn(f64) -> SimResult<D> + Sync,
{
    run_sweep_with(values, |value| Ok((build_model(value)?, x0)), t0, t_end, opts)
}

/// Like [`run_sweep`], with the initial state built alongside each model.
///
/// Useful when the starting point depends on the swept parameter, e.g. a
/// static deflection under a swept load.
pub fn run_sweep_with<D, F>(
    values: &[f64],
    build: F,
    t0: f64,
    t_end: f64,
    opts: &SimOptions,
) -> SimResult<Vec<SweepPoint>>
where
    D: Dynamics,
    F: Fn(f64) -> SimResult<(D, State)> + Sync,
{
    if values.is_empty() {
        return Err(SimError::InvalidArg {
            what: "sweep needs at least one value",
        });
    }

    tracing::info!(points = values.len(), t0, t_end, "running sweep");

    let points = values
        .par_iter()
        .map(|&value| {
            let (dynamics, x0) = build(value)?;
            let system = MsdSystem::new(dynamics);
            let record = run_sim(&system, t0, t_end, x0, opts)?;
            if !record.success() {
                tracing::warn!(value, status = ?record.stats.status, "sweep point did not finish");
            }
            Ok(SweepPoint { value, record })
        })
        .collect::<SimResult<Vec<_>>>()?;

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_points() {
        let def = SweepDefinition::new(1.0, 7.0, 4, SweepType::Linear).unwrap();
        assert_eq!(def.generate_points(), vec![1.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn logarithmic_points() {
        let def = SweepDefinition::new(1.0, 1000.0, 4, SweepType::Logarithmic).unwrap();
        let pts = def.generate_points();
        assert_eq!(pts.len(), 4);
        assert!((pts[1] - 10.0).abs() < 1e-9);
        assert!((pts[2] - 100.0).abs() < 1e-9);
        assert_eq!(pts[3], 1000.0);
    }

    #[test]
    fn invalid_definitions() {
        assert!(SweepDefinition::new(1.0, 2.0, 1, SweepType::Linear).is_err());
        assert!(SweepDefinition::new(1.0, 1.0, 5, SweepType::Linear).is_err());
        assert!(SweepDefinition::new(-1.0, 10.0, 5, SweepType::Logarithmic).is_err());
        assert!(SweepDefinition::new(f64::NAN, 10.0, 5, SweepType::Linear).is_err());
    }

    #[test]
    fn display() {
        let def = SweepDefinition::new(1.0, 2.0, 3, SweepType::Logarithmic).unwrap();
        assert_eq!(def.to_string(), "Sweep from 1 to 2 (3 points, Logarithmic)");
    }

    #[test]
    fn empty_value_list_rejected() {
        let result = run_sweep(
            &[],
            |_| Ok(msd_model::Msd::default()),
            0.0,
            1.0,
            State::default(),
            &SimOptions::default(),
        );
        assert!(matches!(result, Err(SimError::InvalidArg { .. })));
    }
}
