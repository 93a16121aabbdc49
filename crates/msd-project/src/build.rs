//! Construct runnable models from scenario definitions.

use msd_core::units::{disc_area, fluid_column_density, kg_per_m, kg_per_m3, m};
use msd_model::{Dynamics, Law, MassRateArgument, MomentumMsd, Msd, State};
use msd_sim::SimOptions;

use crate::ProjectResult;
use crate::schema::{
    InitialDef, LawDef, MassRateArgumentDef, ModelDef, Scenario, SolverDef, SweepParameter,
};
use crate::validate::{ValidationError, validate_scenario};

/// Everything `run_sim` needs for one scenario.
pub struct BuiltScenario {
    pub dynamics: Box<dyn Dynamics>,
    pub x0: State,
    pub t0: f64,
    pub t_end: f64,
    pub options: SimOptions,
}

pub fn build_law(def: &LawDef) -> Law {
    match def {
        LawDef::Constant { value } => Law::constant(*value),
        LawDef::Linear { slope, offset } if *offset == 0.0 => Law::linear(*slope),
        LawDef::Linear { slope, offset } => Law::affine(*offset, *slope),
        LawDef::Polynomial { coefficients } => Law::polynomial(coefficients.clone()),
        LawDef::Power {
            coefficient,
            exponent,
        } => Law::power(*coefficient, *exponent as i32),
        LawDef::Bellow {
            m0_kg,
            fluid_density_kg_m3,
            radius_m,
        } => {
            let area = disc_area(m(*radius_m));
            let per_m = kg_per_m(fluid_column_density(kg_per_m3(*fluid_density_kg_m3), area));
            Law::affine(*m0_kg, per_m)
        }
        LawDef::Harmonic {
            dead_load,
            amplitude,
            frequency_hz,
        } => Law::harmonic(*dead_load, *amplitude, *frequency_hz),
        LawDef::HarmonicSweep {
            dead_load,
            amplitude,
            sweep_rate_s,
        } => Law::harmonic_sweep(*dead_load, *amplitude, *sweep_rate_s),
    }
}

/// Base oscillator from the four main laws (mass rate ignored).
pub fn build_msd(model: &ModelDef) -> Msd {
    Msd::new(
        build_law(&model.mass),
        build_law(&model.elastic),
        build_law(&model.damping),
        build_law(&model.forcing),
    )
    .with_mass_guard(model.mass_guard)
}

/// Base or momentum-based model, depending on whether a mass rate is given.
pub fn build_dynamics(model: &ModelDef) -> Box<dyn Dynamics> {
    let base = build_msd(model);
    match &model.mass_rate {
        None => Box::new(base),
        Some(rate) => {
            let argument = match rate.argument {
                MassRateArgumentDef::Velocity => MassRateArgument::Velocity,
                MassRateArgumentDef::Displacement => MassRateArgument::Displacement,
            };
            Box::new(MomentumMsd::new(base, build_law(&rate.law)).with_argument(argument))
        }
    }
}

pub fn initial_state(initial: &InitialDef, base: &Msd, t0: f64) -> State {
    match initial {
        InitialDef::State { x0, v0 } => State::new(*x0, *v0),
        InitialDef::StaticDeflection { v0 } => State::new(base.static_deflection(t0), *v0),
    }
}

pub fn sim_options(solver: &SolverDef) -> SimOptions {
    SimOptions {
        integrator: solver.method,
        dt: solver.dt,
        atol: solver.atol,
        rtol: solver.rtol,
        max_steps: solver.max_steps,
        record_every: solver.record_every,
        ..SimOptions::default()
    }
}

/// Validate and build the scenario as written (sweep ignored).
pub fn build_scenario(scenario: &Scenario) -> ProjectResult<BuiltScenario> {
    validate_scenario(scenario)?;
    Ok(build_unchecked(scenario, &scenario.model))
}

/// Build the model and initial state for one sweep value.
pub fn build_sweep_point(
    scenario: &Scenario,
    parameter: SweepParameter,
    value: f64,
) -> ProjectResult<(Box<dyn Dynamics>, State)> {
    let model = apply_sweep_value(&scenario.model, parameter, value)?;
    let built = build_unchecked(scenario, &model);
    Ok((built.dynamics, built.x0))
}

fn build_unchecked(scenario: &Scenario, model: &ModelDef) -> BuiltScenario {
    let t0 = scenario.time.t0;
    let x0 = initial_state(&scenario.initial, &build_msd(model), t0);
    BuiltScenario {
        dynamics: build_dynamics(model),
        x0,
        t0,
        t_end: scenario.time.t_end,
        options: sim_options(&scenario.solver),
    }
}

/// Copy of `model` with the swept parameter set to `value`.
pub fn apply_sweep_value(
    model: &ModelDef,
    parameter: SweepParameter,
    value: f64,
) -> Result<ModelDef, ValidationError> {
    let mut out = model.clone();
    let unsupported = |law: &str| ValidationError::Unsupported {
        feature: format!("{parameter:?} sweep"),
        reason: format!("not applicable to a {law} law"),
    };

    match parameter {
        SweepParameter::ElasticExponent => {
            let coefficient = match &model.elastic {
                LawDef::Power { coefficient, .. } => *coefficient,
                LawDef::Linear { slope, offset } if *offset == 0.0 => *slope,
                other => return Err(unsupported(law_kind(other))),
            };
            out.elastic = LawDef::Power {
                coefficient,
                exponent: value,
            };
        }
        SweepParameter::ElasticStiffness => {
            set_linear_coefficient(&mut out.elastic, value)
                .map_err(unsupported)?;
        }
        SweepParameter::DampingCoefficient => {
            set_linear_coefficient(&mut out.damping, value)
                .map_err(unsupported)?;
        }
        SweepParameter::ForcingAmplitude => match &mut out.forcing {
            LawDef::Harmonic { amplitude, .. } | LawDef::HarmonicSweep { amplitude, .. } => {
                *amplitude = value;
            }
            other => return Err(unsupported(law_kind(other))),
        },
    }
    Ok(out)
}

fn set_linear_coefficient(law: &mut LawDef, value: f64) -> Result<(), &'static str> {
    match law {
        LawDef::Linear { slope, .. } => *slope = value,
        LawDef::Power { coefficient, .. } => *coefficient = value,
        LawDef::Polynomial { coefficients } => {
            if coefficients.len() < 2 {
                coefficients.resize(2, 0.0);
            }
            coefficients[1] = value;
        }
        other => return Err(law_kind(other)),
    }
    Ok(())
}

pub(crate) fn law_kind(law: &LawDef) -> &'static str {
    match law {
        LawDef::Constant { .. } => "Constant",
        LawDef::Linear { .. } => "Linear",
        LawDef::Polynomial { .. } => "Polynomial",
        LawDef::Power { .. } => "Power",
        LawDef::Bellow { .. } => "Bellow",
        LawDef::Harmonic { .. } => "Harmonic",
        LawDef::HarmonicSweep { .. } => "HarmonicSweep",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MassRateDef;
    use msd_core::{Tolerances, nearly_equal};
    use std::f64::consts::PI;

    const TIGHT: Tolerances = Tolerances::new(1e-12, 1e-12);

    #[test]
    fn bellow_law_matches_hand_computation() {
        let law = build_law(&LawDef::Bellow {
            m0_kg: 1e-3,
            fluid_density_kg_m3: 1000.0,
            radius_m: 0.01,
        });
        let expected = 1e-3 + 1000.0 * PI * 0.01 * 0.01 * 2.0;
        assert!(nearly_equal(law.eval(2.0), expected, TIGHT));
    }

    #[test]
    fn linear_with_offset() {
        let law = build_law(&LawDef::Linear {
            slope: 2.0,
            offset: 1.0,
        });
        assert_eq!(law.eval(3.0), 7.0);
    }

    #[test]
    fn default_model_derivative() {
        let dynamics = build_dynamics(&ModelDef::default());
        let d = dynamics.derivative(0.0, State::new(0.0, 1.0));
        assert!(nearly_equal(d.dx, 1.0, TIGHT));
        assert!(nearly_equal(d.dv, -0.1, TIGHT));
    }

    #[test]
    fn mass_rate_selects_momentum_model() {
        let model = ModelDef {
            mass_rate: Some(MassRateDef {
                law: LawDef::Linear {
                    slope: 0.1,
                    offset: 0.0,
                },
                argument: MassRateArgumentDef::Velocity,
            }),
            ..ModelDef::default()
        };
        let dynamics = build_dynamics(&model);
        assert_eq!(dynamics.name(), "MSD (momentum)");
        let d = dynamics.derivative(0.0, State::new(0.0, 1.0));
        // base -0.1, correction 0.1·1·1/1
        assert!(nearly_equal(d.dv, -0.2, TIGHT));
    }

    #[test]
    fn static_deflection_initial_state() {
        let model = ModelDef {
            elastic: LawDef::Linear {
                slope: 40.0,
                offset: 0.0,
            },
            forcing: LawDef::HarmonicSweep {
                dead_load: 100.0,
                amplitude: 1.0,
                sweep_rate_s: 10_000.0,
            },
            ..ModelDef::default()
        };
        let x0 = initial_state(
            &InitialDef::StaticDeflection { v0: 0.0 },
            &build_msd(&model),
            5000.0,
        );
        assert!((x0.x - 2.5).abs() < 1e-9);
        assert_eq!(x0.v, 0.0);
    }

    #[test]
    fn exponent_sweep_keeps_coefficient() {
        let model = ModelDef {
            elastic: LawDef::Power {
                coefficient: 2.0,
                exponent: 1.0,
            },
            ..ModelDef::default()
        };
        let swept = apply_sweep_value(&model, SweepParameter::ElasticExponent, 3.0).unwrap();
        assert_eq!(
            swept.elastic,
            LawDef::Power {
                coefficient: 2.0,
                exponent: 3.0
            }
        );
    }

    #[test]
    fn amplitude_sweep_requires_harmonic_forcing() {
        let err = apply_sweep_value(&ModelDef::default(), SweepParameter::ForcingAmplitude, 1.0)
            .unwrap_err();
        assert!(matches!(err, ValidationError::Unsupported { .. }));
    }

    #[test]
    fn stiffness_sweep_on_polynomial() {
        let model = ModelDef {
            elastic: LawDef::Polynomial {
                coefficients: vec![0.0],
            },
            ..ModelDef::default()
        };
        let swept = apply_sweep_value(&model, SweepParameter::ElasticStiffness, 5.0).unwrap();
        assert_eq!(
            swept.elastic,
            LawDef::Polynomial {
                coefficients: vec![0.0, 5.0]
            }
        );
    }
}
