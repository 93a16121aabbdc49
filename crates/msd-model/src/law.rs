//! Scalar force and mass laws.
//!
//! A `Law` is a named, shareable `Fn(f64) -> f64`. The same type serves every
//! role in the model: mass m(x), elastic force e(x), damping force d(v),
//! mass rate dm/dt and external forcing f(t). Laws must be pure; the model
//! calls them at solver-chosen points in any order.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

type LawFn = dyn Fn(f64) -> f64 + Send + Sync;

/// Named scalar-to-scalar law.
#[derive(Clone)]
pub struct Law {
    name: String,
    f: Arc<LawFn>,
}

impl Law {
    /// Wrap an arbitrary closure.
    pub fn new(name: impl Into<String>, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the law at `arg` (position, velocity or time depending on role).
    #[inline]
    pub fn eval(&self, arg: f64) -> f64 {
        (self.f)(arg)
    }

    /// Constant value, independent of the argument.
    pub fn constant(value: f64) -> Self {
        Self::new(format!("{value}"), move |_| value)
    }

    /// slope · x
    pub fn linear(slope: f64) -> Self {
        Self::new(format!("{slope}·x"), move |x| slope * x)
    }

    /// offset + slope · x, e.g. a bellow mass m0 + ρA·x.
    pub fn affine(offset: f64, slope: f64) -> Self {
        Self::new(format!("{offset} + {slope}·x"), move |x| offset + slope * x)
    }

    /// Σ cᵢ·xⁱ with coefficients in ascending powers, evaluated by Horner's rule.
    pub fn polynomial(coefficients: Vec<f64>) -> Self {
        let name = coefficients
            .iter()
            .enumerate()
            .map(|(i, c)| match i {
                0 => format!("{c}"),
                1 => format!("{c}·x"),
                _ => format!("{c}·x^{i}"),
            })
            .collect::<Vec<_>>()
            .join(" + ");
        Self::new(name, move |x| {
            coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
        })
    }

    /// coefficient · x^exponent. Odd exponents give a stiffening spring.
    pub fn power(coefficient: f64, exponent: i32) -> Self {
        Self::new(format!("{coefficient}·x^{exponent}"), move |x| {
            coefficient * x.powi(exponent)
        })
    }

    /// f0 + fh · sin(2π · freq · t)
    pub fn harmonic(dead_load: f64, amplitude: f64, frequency_hz: f64) -> Self {
        Self::new(
            format!("{dead_load} + {amplitude}·sin(2π·{frequency_hz}·t)"),
            move |t| dead_load + amplitude * (2.0 * PI * frequency_hz * t).sin(),
        )
    }

    /// f0 + fh · sin(2π · w(t) · t) with w(t) = t / s: a linear frequency sweep.
    pub fn harmonic_sweep(dead_load: f64, amplitude: f64, sweep_rate_s: f64) -> Self {
        Self::new(
            format!("{dead_load} + {amplitude}·sin(2π·(t/{sweep_rate_s})·t)"),
            move |t| dead_load + amplitude * (2.0 * PI * (t / sweep_rate_s) * t).sin(),
        )
    }

    /// Pointwise sum, e.g. a linear spring plus a cubic stiffening term.
    pub fn plus(self, other: Law) -> Self {
        let name = format!("{} + {}", self.name, other.name);
        Self::new(name, move |x| self.eval(x) + other.eval(x))
    }
}

impl fmt::Debug for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Law").field(&self.name).finish()
    }
}
