//! Time integrators: fixed-step ForwardEuler and RK4, adaptive Dormand-Prince 5(4).

use crate::error::SimResult;
use crate::model::TransientModel;

/// Trait for fixed-step time integrators.
pub trait Integrator {
    /// Advance state by one time step using the transient model.
    fn step<M: TransientModel>(
        &self,
        model: &M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State>;
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Copy, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<M: TransientModel>(
        &self,
        model: &M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let k1 = model.rhs(t, x)?;

        let x2 = model.add(x, &model.scale(&k1, 0.5 * dt));
        let k2 = model.rhs(t + 0.5 * dt, &x2)?;

        let x3 = model.add(x, &model.scale(&k2, 0.5 * dt));
        let k3 = model.rhs(t + 0.5 * dt, &x3)?;

        let x4 = model.add(x, &model.scale(&k3, dt));
        let k4 = model.rhs(t + dt, &x4)?;

        // x_new = x + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        let k_sum = model.add(
            &model.add(&k1, &model.scale(&k2, 2.0)),
            &model.add(&model.scale(&k3, 2.0), &k4),
        );

        Ok(model.add(x, &model.scale(&k_sum, dt / 6.0)))
    }
}

/// Forward Euler (explicit, 1st order).
/// Calls rhs() once per step instead of 4 times (RK4).
#[derive(Clone, Copy, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<M: TransientModel>(
        &self,
        model: &M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let xdot = model.rhs(t, x)?;
        Ok(model.add(x, &model.scale(&xdot, dt)))
    }
}

// Dormand-Prince 5(4) tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (also row 7 of A, which makes the method FSAL).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// b - b*, difference between 5th and embedded 4th-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Outcome of one trial step of an embedded pair.
#[derive(Clone, Debug)]
pub struct EmbeddedStep<S> {
    /// 5th-order solution at t + h.
    pub x: S,
    /// Derivative at (t + h, x), reused as the next step's first stage.
    pub k_end: S,
    /// Scaled RMS error; the step is acceptable when this is <= 1.
    pub error: f64,
}

/// Adaptive Dormand-Prince 5(4) with first-same-as-last stages.
///
/// Error control uses RMS(err_i / (atol + rtol·max(|x0_i|, |x1_i|))).
#[derive(Clone, Copy, Debug)]
pub struct DormandPrince45 {
    pub atol: f64,
    pub rtol: f64,
}

impl DormandPrince45 {
    pub fn new(atol: f64, rtol: f64) -> Self {
        Self { atol, rtol }
    }

    /// Attempt one step of size `h` from (t, x), given k1 = f(t, x).
    ///
    /// Costs six rhs evaluations.
    pub fn attempt<M: TransientModel>(
        &self,
        model: &M,
        t: f64,
        x: &M::State,
        k1: &M::State,
        h: f64,
    ) -> SimResult<EmbeddedStep<M::State>> {
        let k2 = model.rhs(t + C2 * h, &combine(model, x, h, &[(A21, k1)]))?;
        let k3 = model.rhs(t + C3 * h, &combine(model, x, h, &[(A31, k1), (A32, &k2)]))?;
        let k4 = model.rhs(
            t + C4 * h,
            &combine(model, x, h, &[(A41, k1), (A42, &k2), (A43, &k3)]),
        )?;
        let k5 = model.rhs(
            t + C5 * h,
            &combine(model, x, h, &[(A51, k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        )?;
        let k6 = model.rhs(
            t + h,
            &combine(
                model,
                x,
                h,
                &[(A61, k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
            ),
        )?;

        let x_new = combine(
            model,
            x,
            h,
            &[(B1, k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
        );
        let k7 = model.rhs(t + h, &x_new)?;

        let err = [(E3, &k3), (E4, &k4), (E5, &k5), (E6, &k6), (E7, &k7)]
            .iter()
            .fold(model.scale(k1, h * E1), |acc, (c, k)| {
                model.add(&acc, &model.scale(k, h * c))
            });

        let x0 = model.to_vec(x);
        let x1 = model.to_vec(&x_new);
        let e = model.to_vec(&err);
        let scale: Vec<f64> = x0
            .iter()
            .zip(&x1)
            .map(|(a, b)| self.atol + self.rtol * a.abs().max(b.abs()))
            .collect();

        Ok(EmbeddedStep {
            x: x_new,
            k_end: k7,
            error: rms_norm(&e, &scale),
        })
    }

    /// Step-size multiplier after a trial step with the given error.
    ///
    /// After a rejection within the same step the multiplier is capped at 1.
    pub fn step_factor(error: f64, after_reject: bool) -> f64 {
        let factor = if error == 0.0 {
            MAX_FACTOR
        } else {
            (SAFETY * error.powf(ERROR_EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR)
        };
        if after_reject { factor.min(1.0) } else { factor }
    }

    /// Factor applied when a trial step produced a non-finite error.
    pub fn shrink_factor() -> f64 {
        MIN_FACTOR
    }

    /// Starting step size from the local scale of the solution and its derivative.
    ///
    /// Costs one rhs evaluation.
    pub fn initial_step<M: TransientModel>(
        &self,
        model: &M,
        t0: f64,
        x0: &M::State,
        k1: &M::State,
        span: f64,
    ) -> SimResult<f64> {
        let y0 = model.to_vec(x0);
        let f0 = model.to_vec(k1);
        let scale: Vec<f64> = y0.iter().map(|y| self.atol + self.rtol * y.abs()).collect();

        let d0 = rms_norm(&y0, &scale);
        let d1 = rms_norm(&f0, &scale);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };
        let h0 = h0.min(span);

        let x1 = model.add(x0, &model.scale(k1, h0));
        let f1 = model.to_vec(&model.rhs(t0 + h0, &x1)?);
        let diff: Vec<f64> = f1.iter().zip(&f0).map(|(a, b)| a - b).collect();
        let d2 = rms_norm(&diff, &scale) / h0;

        let h1 = if d1.max(d2) <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / 5.0)
        };

        Ok((100.0 * h0).min(h1).min(span))
    }
}

/// x + h · Σ cᵢ·kᵢ
fn combine<M: TransientModel>(
    model: &M,
    x: &M::State,
    h: f64,
    terms: &[(f64, &M::State)],
) -> M::State {
    terms.iter().fold(x.clone(), |acc, (c, k)| {
        model.add(&acc, &model.scale(k, h * c))
    })
}

/// sqrt(mean((v_i / scale_i)²))
fn rms_norm(v: &[f64], scale: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v
        .iter()
        .zip(scale)
        .map(|(a, s)| (a / s) * (a / s))
        .sum();
    (sum / v.len() as f64).sqrt()
}
