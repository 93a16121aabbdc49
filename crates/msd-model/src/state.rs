//! Oscillator state and its time derivative.

use std::ops::{Add, Mul};

/// Instantaneous configuration of the oscillator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct State {
    /// Position (m)
    pub x: f64,
    /// Velocity (m/s)
    pub v: f64,
}

impl State {
    pub const fn new(x: f64, v: f64) -> Self {
        Self { x, v }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.v.is_finite()
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.v]
    }
}

impl From<[f64; 2]> for State {
    fn from([x, v]: [f64; 2]) -> Self {
        Self { x, v }
    }
}

impl Add for State {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            v: self.v + rhs.v,
        }
    }
}

impl Mul<f64> for State {
    type Output = Self;

    fn mul(self, scale: f64) -> Self::Output {
        Self {
            x: self.x * scale,
            v: self.v * scale,
        }
    }
}

/// Result of one model evaluation: (dx/dt, dv/dt) = (v, a).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StateDerivative {
    /// dx/dt, equal to the velocity
    pub dx: f64,
    /// dv/dt, the acceleration
    pub dv: f64,
}

impl StateDerivative {
    pub const fn new(dx: f64, dv: f64) -> Self {
        Self { dx, dv }
    }

    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dv.is_finite()
    }

    /// Rate expressed as a state-shaped increment, for integrator arithmetic.
    pub fn as_state(self) -> State {
        State {
            x: self.dx,
            v: self.dv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_arithmetic() {
        let a = State::new(1.0, -2.0);
        let b = State::new(0.5, 0.5);
        assert_eq!(a + b, State::new(1.5, -1.5));
        assert_eq!(a * 2.0, State::new(2.0, -4.0));
    }

    #[test]
    fn state_from_array() {
        let s = State::from([3.0, 4.0]);
        assert_eq!(s.to_array(), [3.0, 4.0]);
    }

    #[test]
    fn derivative_as_state() {
        let d = StateDerivative::new(1.0, -0.1);
        assert_eq!(d.as_state(), State::new(1.0, -0.1));
    }

    #[test]
    fn finiteness() {
        assert!(State::new(0.0, 1.0).is_finite());
        assert!(!State::new(f64::NAN, 1.0).is_finite());
        assert!(!StateDerivative::new(0.0, f64::INFINITY).is_finite());
    }
}
