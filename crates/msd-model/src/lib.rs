//! Mass-spring-damper dynamics.
//!
//! Provides:
//! - `State` / `StateDerivative` for the (x, v) first-order system
//! - `Law`, an injected scalar force/mass law with preset families
//! - `Dynamics`, the evaluation contract shared by every model
//! - `Msd`, the base oscillator: m(x)·a + d(v) + e(x) = f(t)
//! - `MomentumMsd`, which adds the dm/dt·v inertial correction

pub mod dynamics;
pub mod law;
pub mod momentum;
pub mod state;

mod guard;

// Re-exports for public API
pub use dynamics::{Dynamics, Msd};
pub use law::Law;
pub use momentum::{MassRateArgument, MomentumMsd};
pub use state::{State, StateDerivative};
