//! Time integration for oscillator models.
//!
//! Provides:
//! - `TransientModel`, the right-hand-side contract, and `MsdSystem`, which
//!   adapts any `Dynamics` model to it
//! - Fixed-step ForwardEuler and RK4 integrators
//! - Adaptive Dormand-Prince 5(4) with embedded error control
//! - `run_sim`, returning a sampled trajectory plus diagnostics
//! - Independent parallel sweeps over a parameter

pub mod error;
pub mod integrator;
pub mod model;
pub mod sim;
pub mod sweep;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use integrator::{DormandPrince45, ForwardEuler, Integrator, RK4};
pub use model::{MsdSystem, TransientModel};
pub use sim::{IntegratorType, SimOptions, SimRecord, SimStats, SimStatus, run_sim};
pub use sweep::{SweepDefinition, SweepPoint, SweepType, run_sweep, run_sweep_with};
