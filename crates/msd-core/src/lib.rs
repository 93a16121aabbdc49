//! msd-core: shared foundation for msdflow.
//!
//! Contains:
//! - units (uom SI types + constructors used by the force-law presets)
//! - numeric (Real + tolerances + float helpers)
//! - timing (wall-clock timer for run summaries)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod timing;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use timing::Timer;
