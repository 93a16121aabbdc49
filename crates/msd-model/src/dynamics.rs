//! Base mass-spring-damper model.
//!
//! Governing equation:
//!
//! ```text
//! m(x)·a + d(v) + e(x) = f(t)   ⇒   a = (f(t) − d(v) − e(x)) / m(x)
//! ```
//!
//! written as the first-order system dx/dt = v, dv/dt = a.

use crate::guard;
use crate::law::Law;
use crate::state::{State, StateDerivative};
use msd_core::{CoreResult, ensure_finite};

/// Evaluation contract shared by all oscillator models.
///
/// Implementations are stateless between calls: everything a call needs is
/// passed in as (t, state), so one model can back any number of runs,
/// sequential or parallel.
pub trait Dynamics: Send + Sync {
    /// Model name (used for display and logging).
    fn name(&self) -> &str;

    /// Compute (dx/dt, dv/dt) at time `t` and `state`.
    ///
    /// Mass must stay strictly positive over the reachable states. This is not
    /// checked here: a zero mass yields a non-finite acceleration.
    fn derivative(&self, t: f64, state: State) -> StateDerivative;

    /// Mass at position `x`.
    fn mass(&self, x: f64) -> f64;

    /// Whether evaluation should go through [`Dynamics::try_derivative`].
    fn mass_guard(&self) -> bool {
        false
    }

    /// Checked evaluation: rejects non-positive mass and non-finite output.
    fn try_derivative(&self, t: f64, state: State) -> CoreResult<StateDerivative> {
        guard::check_mass(self.mass(state.x))?;
        let d = self.derivative(t, state);
        ensure_finite(d.dv, "acceleration")?;
        Ok(d)
    }
}

impl<D: Dynamics + ?Sized> Dynamics for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn derivative(&self, t: f64, state: State) -> StateDerivative {
        (**self).derivative(t, state)
    }

    fn mass(&self, x: f64) -> f64 {
        (**self).mass(x)
    }

    fn mass_guard(&self) -> bool {
        (**self).mass_guard()
    }

    fn try_derivative(&self, t: f64, state: State) -> CoreResult<StateDerivative> {
        (**self).try_derivative(t, state)
    }
}

/// Mass-spring-damper oscillator built from four injected laws.
#[derive(Clone, Debug)]
pub struct Msd {
    mass: Law,
    elastic: Law,
    damping: Law,
    forcing: Law,
    mass_guard: bool,
}

impl Default for Msd {
    /// Unit mass, unit linear spring, damping 0.1·v, no forcing.
    fn default() -> Self {
        Self {
            mass: Law::constant(1.0),
            elastic: Law::linear(1.0),
            damping: Law::linear(0.1),
            forcing: Law::constant(0.0),
            mass_guard: false,
        }
    }
}

impl Msd {
    /// Create a model from mass m(x), elastic e(x), damping d(v) and forcing f(t).
    pub fn new(mass: Law, elastic: Law, damping: Law, forcing: Law) -> Self {
        Self {
            mass,
            elastic,
            damping,
            forcing,
            mass_guard: false,
        }
    }

    pub fn with_mass(mut self, mass: Law) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_elastic(mut self, elastic: Law) -> Self {
        self.elastic = elastic;
        self
    }

    pub fn with_damping(mut self, damping: Law) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_forcing(mut self, forcing: Law) -> Self {
        self.forcing = forcing;
        self
    }

    /// Enable the mass positivity check (off by default).
    pub fn with_mass_guard(mut self, enabled: bool) -> Self {
        self.mass_guard = enabled;
        self
    }

    // Individual laws, callable on their own.

    pub fn mass_law(&self) -> &Law {
        &self.mass
    }

    pub fn elastic_law(&self) -> &Law {
        &self.elastic
    }

    pub fn damping_law(&self) -> &Law {
        &self.damping
    }

    pub fn forcing_law(&self) -> &Law {
        &self.forcing
    }

    /// Elastic force e(x).
    #[inline]
    pub fn elastic(&self, x: f64) -> f64 {
        self.elastic.eval(x)
    }

    /// Damping force d(v).
    #[inline]
    pub fn damping(&self, v: f64) -> f64 {
        self.damping.eval(v)
    }

    /// External force f(t).
    #[inline]
    pub fn forcing(&self, t: f64) -> f64 {
        self.forcing.eval(t)
    }

    /// a = (f(t) − d(v) − e(x)) / m(x)
    #[inline]
    pub fn acceleration(&self, t: f64, x: f64, v: f64) -> f64 {
        let m = self.mass.eval(x);
        if self.mass_guard {
            guard::warn_on_bad_mass("MSD", m, x);
        }
        (self.forcing(t) - self.damping(v) - self.elastic(x)) / m
    }

    /// Deflection under the load present at `t`, taking e(1.0) as the stiffness.
    ///
    /// Exact for a linear spring e(x) = k·x; for a nonlinear spring it is the
    /// secant estimate through x = 1.
    pub fn static_deflection(&self, t: f64) -> f64 {
        self.forcing(t) / self.elastic(1.0)
    }
}

impl Dynamics for Msd {
    fn name(&self) -> &str {
        "MSD"
    }

    #[inline]
    fn derivative(&self, t: f64, state: State) -> StateDerivative {
        StateDerivative {
            dx: state.v,
            dv: self.acceleration(t, state.x, state.v),
        }
    }

    #[inline]
    fn mass(&self, x: f64) -> f64 {
        self.mass.eval(x)
    }

    fn mass_guard(&self) -> bool {
        self.mass_guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msd_core::{CoreError, Tolerances, nearly_equal};

    const TIGHT: Tolerances = Tolerances::new(1e-12, 1e-12);

    #[test]
    fn default_model_baseline_derivative() {
        let model = Msd::default();
        let d = model.derivative(0.0, State::new(0.0, 1.0));
        assert!(nearly_equal(d.dx, 1.0, TIGHT));
        assert!(nearly_equal(d.dv, -0.1, TIGHT));
    }

    #[test]
    fn laws_callable_individually() {
        let model = Msd::default();
        assert_eq!(model.mass(3.0), 1.0);
        assert_eq!(model.elastic(2.0), 2.0);
        assert!(nearly_equal(model.damping(2.0), 0.2, TIGHT));
        assert_eq!(model.forcing(123.0), 0.0);
    }

    #[test]
    fn dead_load_equilibrium_has_zero_derivative() {
        let k = 40.0;
        let f0 = 100.0;
        let model = Msd::default()
            .with_elastic(Law::linear(k))
            .with_damping(Law::constant(0.0))
            .with_forcing(Law::constant(f0));

        let x_eq = model.static_deflection(0.0);
        assert!(nearly_equal(x_eq, f0 / k, TIGHT));

        let d = model.derivative(0.0, State::new(x_eq, 0.0));
        assert!(d.dx.abs() < 1e-12);
        assert!(d.dv.abs() < 1e-12);
    }

    #[test]
    fn evaluation_does_not_mutate_model() {
        let model = Msd::default().with_forcing(Law::harmonic(1.0, 0.5, 2.0));
        let s = State::new(0.3, -0.7);
        let first = model.derivative(1.25, s);
        let _ = model.derivative(9.0, State::new(5.0, 5.0));
        let again = model.derivative(1.25, s);
        assert_eq!(first, again);
    }

    #[test]
    fn zero_mass_is_unchecked_by_default() {
        let model = Msd::default().with_mass(Law::constant(0.0));
        let d = model.derivative(0.0, State::new(1.0, 0.0));
        assert!(!d.dv.is_finite());
    }

    #[test]
    fn mass_guard_does_not_change_result() {
        let unguarded = Msd::default().with_mass(Law::affine(1.0, -1.0));
        let guarded = unguarded.clone().with_mass_guard(true);
        let s = State::new(2.0, 0.5); // m = -1
        assert_eq!(
            unguarded.derivative(0.0, s),
            guarded.derivative(0.0, s)
        );
        assert!(guarded.mass_guard());
        assert!(!unguarded.mass_guard());
    }

    #[test]
    fn try_derivative_rejects_non_positive_mass() {
        let model = Msd::default().with_mass(Law::affine(1.0, -1.0));
        let ok = model.try_derivative(0.0, State::new(0.5, 0.0));
        assert!(ok.is_ok());

        let err = model.try_derivative(0.0, State::new(1.0, 0.0)).unwrap_err();
        assert!(matches!(err, CoreError::NonPhysical { what: "mass", .. }));
    }

    #[test]
    fn boxed_model_delegates() {
        let model: Box<dyn Dynamics> = Box::new(Msd::default().with_mass_guard(true));
        assert_eq!(model.name(), "MSD");
        assert!(model.mass_guard());
        let d = model.derivative(0.0, State::new(0.0, 1.0));
        assert!(nearly_equal(d.dv, -0.1, TIGHT));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use msd_core::{Tolerances, nearly_equal};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn linear_laws_match_closed_form(
            t in -100.0_f64..100.0,
            x in -10.0_f64..10.0,
            v in -10.0_f64..10.0,
            k in 0.0_f64..100.0,
            c in 0.0_f64..10.0,
            m in 0.1_f64..50.0,
            f0 in -100.0_f64..100.0,
            fh in -10.0_f64..10.0,
        ) {
            let model = Msd::new(
                Law::constant(m),
                Law::linear(k),
                Law::linear(c),
                Law::harmonic(f0, fh, 0.25),
            );
            let d = model.derivative(t, State::new(x, v));
            let f = model.forcing(t);
            let expected = (f - c * v - k * x) / m;

            prop_assert_eq!(d.dx, v);
            prop_assert!(nearly_equal(d.dv, expected, Tolerances::new(1e-9, 1e-9)));
        }
    }
}
