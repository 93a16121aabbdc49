//! Simulation runner and result recording.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::integrator::{DormandPrince45, ForwardEuler, Integrator, RK4};
use crate::model::TransientModel;

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegratorType {
    /// Adaptive Dormand-Prince 5(4) (default).
    #[default]
    DormandPrince45,
    /// 4th-order Runge-Kutta, fixed step (4 rhs calls per step).
    RK4,
    /// Forward Euler, fixed step (1 rhs call per step).
    ForwardEuler,
}

impl IntegratorType {
    pub fn is_adaptive(self) -> bool {
        matches!(self, IntegratorType::DormandPrince45)
    }
}

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Integrator type (default: DormandPrince45)
    pub integrator: IntegratorType,
    /// Fixed time step, or the initial step for the adaptive integrator.
    /// Required for fixed-step integrators; estimated automatically when absent.
    pub dt: Option<f64>,
    /// Absolute tolerance (adaptive only)
    pub atol: f64,
    /// Relative tolerance (adaptive only)
    pub rtol: f64,
    /// Maximum number of step attempts, accepted or rejected (safety limit)
    pub max_steps: usize,
    /// Record every N-th accepted step (decimation)
    pub record_every: usize,
    /// Smallest adaptive step before the run stops with `StepSizeUnderflow`
    pub min_dt: f64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            integrator: IntegratorType::default(),
            dt: None,
            atol: 1e-6,
            rtol: 1e-6,
            max_steps: 1_000_000,
            record_every: 1,
            min_dt: 1e-12,
        }
    }
}

impl SimOptions {
    /// Fixed-step options with the given integrator and step.
    pub fn fixed(integrator: IntegratorType, dt: f64) -> Self {
        Self {
            integrator,
            dt: Some(dt),
            ..Self::default()
        }
    }

    /// Adaptive options with the given tolerances.
    pub fn adaptive(atol: f64, rtol: f64) -> Self {
        Self {
            atol,
            rtol,
            ..Self::default()
        }
    }

    fn validate(&self, t0: f64, t_end: f64) -> SimResult<()> {
        if !t0.is_finite() || !t_end.is_finite() {
            return Err(SimError::InvalidArg {
                what: "time span must be finite",
            });
        }
        if t_end <= t0 {
            return Err(SimError::InvalidArg {
                what: "t_end must be greater than t0",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        if let Some(dt) = self.dt
            && !(dt.is_finite() && dt > 0.0)
        {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if self.integrator.is_adaptive() {
            if !(self.atol.is_finite() && self.atol > 0.0) {
                return Err(SimError::InvalidArg {
                    what: "atol must be positive",
                });
            }
            if !(self.rtol.is_finite() && self.rtol > 0.0) {
                return Err(SimError::InvalidArg {
                    what: "rtol must be positive",
                });
            }
            if !(self.min_dt.is_finite() && self.min_dt > 0.0) {
                return Err(SimError::InvalidArg {
                    what: "min_dt must be positive",
                });
            }
        } else if self.dt.is_none() {
            return Err(SimError::InvalidArg {
                what: "dt is required for fixed-step integrators",
            });
        }
        Ok(())
    }
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimStatus {
    /// Reached t_end.
    Finished,
    /// Hit `max_steps` before t_end.
    MaxStepsReached,
    /// Adaptive step shrank below `min_dt`.
    StepSizeUnderflow,
    /// State or derivative became NaN/inf.
    NonFinite,
    /// Mass guard tripped.
    NonPhysical,
}

/// Run diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimStats {
    pub status: SimStatus,
    pub success: bool,
    /// Accepted steps
    pub steps: usize,
    /// Rejected adaptive steps
    pub rejected: usize,
    /// Right-hand-side evaluations
    pub rhs_evals: usize,
    pub message: String,
}

impl SimStats {
    fn new(status: SimStatus, steps: usize, rejected: usize, rhs_evals: usize, message: String) -> Self {
        Self {
            status,
            success: status == SimStatus::Finished,
            steps,
            rejected,
            rhs_evals,
            message,
        }
    }
}

/// Record of simulation results.
///
/// Times are strictly increasing and the first sample is the initial condition.
/// On failure the trajectory holds everything accepted before the stop.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
    pub stats: SimStats,
}

impl<S> SimRecord<S> {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn success(&self) -> bool {
        self.stats.success
    }

    /// Last recorded (t, state).
    pub fn last(&self) -> Option<(f64, &S)> {
        Some((*self.t.last()?, self.x.last()?))
    }

    /// Turn a failed run into an error.
    pub fn into_result(self) -> SimResult<Self> {
        if self.stats.success {
            Ok(self)
        } else {
            Err(SimError::IntegrationFailed {
                status: self.stats.status,
                message: self.stats.message,
            })
        }
    }
}

/// Counts rhs evaluations for the diagnostics.
struct Counted<'a, M> {
    inner: &'a M,
    evals: Cell<usize>,
}

impl<M: TransientModel> TransientModel for Counted<'_, M> {
    type State = M::State;

    fn rhs(&self, t: f64, x: &M::State) -> SimResult<M::State> {
        self.evals.set(self.evals.get() + 1);
        self.inner.rhs(t, x)
    }

    fn add(&self, a: &M::State, b: &M::State) -> M::State {
        self.inner.add(a, b)
    }

    fn scale(&self, a: &M::State, scale: f64) -> M::State {
        self.inner.scale(a, scale)
    }

    fn to_vec(&self, x: &M::State) -> Vec<f64> {
        self.inner.to_vec(x)
    }
}

/// Accumulates the decimated trajectory.
struct Recorder<S> {
    t: Vec<f64>,
    x: Vec<S>,
    every: usize,
    pending: Option<(f64, S)>,
}

impl<S: Clone> Recorder<S> {
    fn new(t0: f64, x0: S, every: usize) -> Self {
        Self {
            t: vec![t0],
            x: vec![x0],
            every,
            pending: None,
        }
    }

    fn accept(&mut self, step: usize, t: f64, x: &S) {
        if step % self.every == 0 {
            self.t.push(t);
            self.x.push(x.clone());
            self.pending = None;
        } else {
            self.pending = Some((t, x.clone()));
        }
    }

    /// Always keep the last accepted state.
    fn finish(mut self, stats: SimStats) -> SimRecord<S> {
        if let Some((t, x)) = self.pending.take() {
            self.t.push(t);
            self.x.push(x);
        }
        SimRecord {
            t: self.t,
            x: self.x,
            stats,
        }
    }
}

/// Map a model error to a terminal status, or pass it through.
fn stop_status(err: SimError) -> SimResult<(SimStatus, String)> {
    match err {
        SimError::NonPhysical { .. } => Ok((SimStatus::NonPhysical, err.to_string())),
        SimError::NonFinite { .. } => Ok((SimStatus::NonFinite, err.to_string())),
        other => Err(other),
    }
}

fn all_finite(v: &[f64]) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Integrate `model` from (t0, x0) to t_end.
///
/// Integration failures (step limit, step-size underflow, non-finite state,
/// mass guard) are reported through `stats` with the partial trajectory.
/// Invalid options are rejected with `SimError::InvalidArg`.
pub fn run_sim<M: TransientModel>(
    model: &M,
    t0: f64,
    t_end: f64,
    x0: M::State,
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    opts.validate(t0, t_end)?;

    let _span = tracing::debug_span!("run_sim", integrator = ?opts.integrator, t0, t_end).entered();

    let counted = Counted {
        inner: model,
        evals: Cell::new(0),
    };

    let record = match opts.integrator {
        IntegratorType::DormandPrince45 => run_adaptive(&counted, t0, t_end, x0, opts)?,
        IntegratorType::RK4 => run_fixed(&counted, &RK4, t0, t_end, x0, opts)?,
        IntegratorType::ForwardEuler => run_fixed(&counted, &ForwardEuler, t0, t_end, x0, opts)?,
    };

    let stats = &record.stats;
    if stats.success {
        tracing::debug!(
            steps = stats.steps,
            rejected = stats.rejected,
            rhs_evals = stats.rhs_evals,
            samples = record.t.len(),
            "simulation finished"
        );
    } else {
        tracing::warn!(
            status = ?stats.status,
            steps = stats.steps,
            t_reached = record.t.last().copied().unwrap_or(t0),
            "simulation stopped early: {}",
            stats.message
        );
    }

    Ok(record)
}

fn run_fixed<M: TransientModel, I: Integrator>(
    model: &Counted<'_, M>,
    integrator: &I,
    t0: f64,
    t_end: f64,
    x0: M::State,
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    let dt = opts.dt.ok_or(SimError::InvalidArg {
        what: "dt is required for fixed-step integrators",
    })?;

    let mut recorder = Recorder::new(t0, x0.clone(), opts.record_every);
    let mut x = x0;
    let mut t = t0;
    let mut step = 0;

    let (status, message) = loop {
        if t >= t_end {
            break (SimStatus::Finished, "reached t_end".to_string());
        }
        if step >= opts.max_steps {
            break (
                SimStatus::MaxStepsReached,
                format!("max_steps ({}) reached at t = {t}", opts.max_steps),
            );
        }

        let t_next = fixed_step_time(t0, t_end, dt, step + 1);
        if t_next <= t {
            break (
                SimStatus::StepSizeUnderflow,
                format!("step size {dt} vanishes at t = {t}"),
            );
        }

        match integrator.step(model, t, &x, t_next - t) {
            Ok(x_next) => {
                if !all_finite(&model.to_vec(&x_next)) {
                    break (SimStatus::NonFinite, format!("non-finite state at t = {t_next}"));
                }
                x = x_next;
                t = t_next;
                step += 1;
                recorder.accept(step, t, &x);
            }
            Err(err) => break stop_status(err)?,
        }
    };

    let stats = SimStats::new(status, step, 0, model.evals.get(), message);
    Ok(recorder.finish(stats))
}

/// Grid time of fixed step `k`, clipped onto `t_end`. A grid point within
/// a rounding slack of `t_end` snaps to it so no sliver step is taken.
fn fixed_step_time(t0: f64, t_end: f64, dt: f64, k: usize) -> f64 {
    let t = t0 + k as f64 * dt;
    if t >= t_end - 1e-9 * dt { t_end } else { t }
}

fn run_adaptive<M: TransientModel>(
    model: &Counted<'_, M>,
    t0: f64,
    t_end: f64,
    x0: M::State,
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    let dp = DormandPrince45::new(opts.atol, opts.rtol);
    let span = t_end - t0;

    let mut recorder = Recorder::new(t0, x0.clone(), opts.record_every);
    let mut accepted = 0;
    let mut rejected = 0;

    let finish = |recorder: Recorder<M::State>,
                  status: SimStatus,
                  message: String,
                  accepted: usize,
                  rejected: usize|
     -> SimResult<SimRecord<M::State>> {
        let stats = SimStats::new(status, accepted, rejected, model.evals.get(), message);
        Ok(recorder.finish(stats))
    };

    let mut k1 = match model.rhs(t0, &x0) {
        Ok(k) => k,
        Err(err) => {
            let (status, message) = stop_status(err)?;
            return finish(recorder, status, message, 0, 0);
        }
    };
    if !all_finite(&model.to_vec(&k1)) {
        return finish(
            recorder,
            SimStatus::NonFinite,
            format!("non-finite derivative at t = {t0}"),
            0,
            0,
        );
    }

    let mut h = match opts.dt {
        Some(dt) => dt.min(span),
        None => match dp.initial_step(model, t0, &x0, &k1, span) {
            Ok(h) => h,
            Err(err) => {
                let (status, message) = stop_status(err)?;
                return finish(recorder, status, message, 0, 0);
            }
        },
    };

    let mut t = t0;
    let mut x = x0;

    let (status, message) = 'outer: loop {
        if t >= t_end {
            break (SimStatus::Finished, "reached t_end".to_string());
        }

        let mut after_reject = false;
        loop {
            if accepted + rejected >= opts.max_steps {
                break 'outer (
                    SimStatus::MaxStepsReached,
                    format!("max_steps ({}) reached at t = {t}", opts.max_steps),
                );
            }
            let min_step = opts.min_dt.max(16.0 * f64::EPSILON * t.abs());
            if h < min_step {
                break 'outer (
                    SimStatus::StepSizeUnderflow,
                    format!("step size {h:e} below minimum {min_step:e} at t = {t}"),
                );
            }

            // Snap onto t_end when the remainder is tiny.
            let remaining = t_end - t;
            let h_try = if h >= remaining || remaining - h < min_step {
                remaining
            } else {
                h
            };

            let trial = match dp.attempt(model, t, &x, &k1, h_try) {
                Ok(trial) => trial,
                Err(err) => break 'outer stop_status(err)?,
            };

            if !trial.error.is_finite() {
                rejected += 1;
                after_reject = true;
                h = h_try * DormandPrince45::shrink_factor();
                continue;
            }

            if trial.error <= 1.0 {
                let t_next = if h_try == remaining { t_end } else { t + h_try };
                if !all_finite(&model.to_vec(&trial.x)) || !all_finite(&model.to_vec(&trial.k_end)) {
                    break 'outer (
                        SimStatus::NonFinite,
                        format!("non-finite state at t = {t_next}"),
                    );
                }
                t = t_next;
                x = trial.x;
                k1 = trial.k_end;
                accepted += 1;
                recorder.accept(accepted, t, &x);
                h = h_try * DormandPrince45::step_factor(trial.error, after_reject);
                break;
            }

            rejected += 1;
            after_reject = true;
            h = h_try * DormandPrince45::step_factor(trial.error, true);
        }
    };

    finish(recorder, status, message, accepted, rejected)
}
