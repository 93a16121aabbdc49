//! TransientModel trait for pluggable dynamic systems.

use msd_model::{Dynamics, State};

use crate::error::SimResult;

/// Trait for transient (dynamic) system models.
///
/// A TransientModel must implement:
/// - State type (Clone, for snapshots)
/// - RHS (right-hand side) computation: x_dot = f(t, x)
/// - Scalar field arithmetic for integration: add states, scale by scalar
/// - Flattening into components, for error control and finiteness checks
pub trait TransientModel {
    /// State type (must be Clone).
    type State: Clone;

    /// Compute state derivative dxdt = f(t, x).
    fn rhs(&self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// Add two states element-wise: result = a + b.
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// Scale a state by a scalar: result = scale * a.
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;

    /// State components in a fixed order.
    fn to_vec(&self, x: &Self::State) -> Vec<f64>;
}

/// Adapts a [`Dynamics`] model to the integrator interface.
///
/// With the mass guard enabled every evaluation goes through
/// [`Dynamics::try_derivative`], so a non-positive mass stops the run with a
/// `NonPhysical` error instead of propagating NaN/inf.
#[derive(Clone, Debug)]
pub struct MsdSystem<D> {
    dynamics: D,
    mass_guard: bool,
}

impl<D: Dynamics> MsdSystem<D> {
    /// Wrap a model. The guard starts with the model's own setting.
    pub fn new(dynamics: D) -> Self {
        let mass_guard = dynamics.mass_guard();
        Self {
            dynamics,
            mass_guard,
        }
    }

    /// Override the mass guard for this run.
    pub fn with_mass_guard(mut self, enabled: bool) -> Self {
        self.mass_guard = enabled;
        self
    }

    pub fn dynamics(&self) -> &D {
        &self.dynamics
    }

    pub fn mass_guard(&self) -> bool {
        self.mass_guard
    }

    pub fn into_inner(self) -> D {
        self.dynamics
    }
}

impl<D: Dynamics> TransientModel for MsdSystem<D> {
    type State = State;

    fn rhs(&self, t: f64, x: &State) -> SimResult<State> {
        let d = if self.mass_guard {
            self.dynamics.try_derivative(t, *x)?
        } else {
            self.dynamics.derivative(t, *x)
        };
        Ok(d.as_state())
    }

    #[inline]
    fn add(&self, a: &State, b: &State) -> State {
        *a + *b
    }

    #[inline]
    fn scale(&self, a: &State, scale: f64) -> State {
        *a * scale
    }

    fn to_vec(&self, x: &State) -> Vec<f64> {
        x.to_array().to_vec()
    }
}
