//! Momentum-based model for state-dependent mass.
//!
//! When mass changes with the state, the inertial force is d(m·v)/dt =
//! m·a + (dm/dt)·v, so
//!
//! ```text
//! a = (f(t) − d(v) − e(x)) / m(x) − (dm/dt · v) / m(x)
//! ```
//!
//! `MomentumMsd` wraps an [`Msd`] and subtracts the correction term from the
//! base acceleration.

use crate::dynamics::{Dynamics, Msd};
use crate::law::Law;
use crate::state::{State, StateDerivative};

/// Which state component the mass-rate law receives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MassRateArgument {
    /// dm/dt(v)
    #[default]
    Velocity,
    /// dm/dt(x)
    Displacement,
}

/// Base oscillator plus the dm/dt·v momentum correction.
#[derive(Clone, Debug)]
pub struct MomentumMsd {
    base: Msd,
    mass_rate: Law,
    argument: MassRateArgument,
}

impl Default for MomentumMsd {
    /// Default base model with dm/dt = 0, i.e. no correction.
    fn default() -> Self {
        Self::new(Msd::default(), Law::constant(0.0))
    }
}

impl MomentumMsd {
    pub fn new(base: Msd, mass_rate: Law) -> Self {
        Self {
            base,
            mass_rate,
            argument: MassRateArgument::default(),
        }
    }

    pub fn with_argument(mut self, argument: MassRateArgument) -> Self {
        self.argument = argument;
        self
    }

    pub fn base(&self) -> &Msd {
        &self.base
    }

    pub fn mass_rate_law(&self) -> &Law {
        &self.mass_rate
    }

    pub fn argument(&self) -> MassRateArgument {
        self.argument
    }

    /// dm/dt at `state`.
    #[inline]
    pub fn mass_rate(&self, state: State) -> f64 {
        match self.argument {
            MassRateArgument::Velocity => self.mass_rate.eval(state.v),
            MassRateArgument::Displacement => self.mass_rate.eval(state.x),
        }
    }

    /// (dm/dt · v) / m(x), the amount subtracted from the base acceleration.
    #[inline]
    pub fn correction(&self, state: State) -> f64 {
        self.mass_rate(state) * state.v / self.base.mass(state.x)
    }
}

impl Dynamics for MomentumMsd {
    fn name(&self) -> &str {
        "MSD (momentum)"
    }

    #[inline]
    fn derivative(&self, t: f64, state: State) -> StateDerivative {
        let mut d = self.base.derivative(t, state);
        d.dv -= self.correction(state);
        d
    }

    #[inline]
    fn mass(&self, x: f64) -> f64 {
        self.base.mass(x)
    }

    fn mass_guard(&self) -> bool {
        self.base.mass_guard()
    }
}

impl From<MomentumMsd> for Msd {
    /// Drop the correction term, keeping the base laws.
    fn from(model: MomentumMsd) -> Self {
        model.base
    }
}
