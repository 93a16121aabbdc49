//! Opt-in mass positivity check.

use msd_core::{CoreResult, ensure_positive};

/// Flag a non-positive or non-finite mass without altering the result.
#[inline]
pub(crate) fn warn_on_bad_mass(model: &str, mass: f64, x: f64) {
    if !(mass.is_finite() && mass > 0.0) {
        tracing::warn!(model, mass, x, "mass law is not strictly positive");
    }
}

pub(crate) fn check_mass(mass: f64) -> CoreResult<f64> {
    ensure_positive(mass, "mass")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_mass_accepts_positive() {
        assert_eq!(check_mass(1e-6).unwrap(), 1e-6);
    }

    #[test]
    fn check_mass_rejects_zero() {
        let err = check_mass(0.0).unwrap_err();
        assert!(err.to_string().contains("mass"));
    }
}
