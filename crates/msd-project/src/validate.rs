//! Scenario validation logic.

use msd_model::Dynamics;

use crate::build::{apply_sweep_value, build_msd, initial_state, law_kind};
use crate::schema::{InitialDef, LATEST_VERSION, LawDef, ModelDef, Scenario, SweepParameter};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", "\"\"", "must not be empty"));
    }

    validate_model(&scenario.model)?;
    validate_time(scenario)?;
    validate_solver(scenario)?;
    validate_initial(scenario, &scenario.model)?;

    if let Some(sweep) = &scenario.sweep {
        if !sweep.values.is_empty() && sweep.range.is_some() {
            return Err(invalid(
                "sweep",
                "values and range",
                "set either values or range, not both",
            ));
        }
        let points = sweep.points();
        if points.is_empty() {
            return Err(invalid("sweep.values", "[]", "sweep needs at least one value"));
        }
        if let Some(range) = &sweep.range {
            range
                .validate()
                .map_err(|e| invalid("sweep.range", range, &e.to_string()))?;
        }
        for (i, value) in points.iter().enumerate() {
            let field = format!("sweep.values[{i}]");
            if !value.is_finite() {
                return Err(invalid(field, value, "must be finite"));
            }
            if sweep.parameter == SweepParameter::ElasticExponent
                && (value.fract() != 0.0 || *value < 0.0)
            {
                return Err(invalid(field, value, "exponent must be a non-negative integer"));
            }
            let model = apply_sweep_value(&scenario.model, sweep.parameter, *value)?;
            validate_initial(scenario, &model)?;
        }
    }

    Ok(())
}

fn validate_model(model: &ModelDef) -> Result<(), ValidationError> {
    validate_law("model.mass", &model.mass)?;
    validate_law("model.elastic", &model.elastic)?;
    validate_law("model.damping", &model.damping)?;
    validate_law("model.forcing", &model.forcing)?;
    if let Some(rate) = &model.mass_rate {
        validate_law("model.mass_rate.law", &rate.law)?;
    }
    Ok(())
}

fn validate_law(field: &str, law: &LawDef) -> Result<(), ValidationError> {
    let finite = |name: &str, v: f64| {
        if v.is_finite() {
            Ok(())
        } else {
            Err(invalid(format!("{field}.{name}"), v, "must be finite"))
        }
    };

    match law {
        LawDef::Constant { value } => finite("value", *value)?,
        LawDef::Linear { slope, offset } => {
            finite("slope", *slope)?;
            finite("offset", *offset)?;
        }
        LawDef::Polynomial { coefficients } => {
            for c in coefficients {
                finite("coefficients", *c)?;
            }
        }
        LawDef::Power {
            coefficient,
            exponent,
        } => {
            finite("coefficient", *coefficient)?;
            finite("exponent", *exponent)?;
            if exponent.fract() != 0.0 || *exponent < 0.0 || *exponent > i32::MAX as f64 {
                return Err(invalid(
                    format!("{field}.exponent"),
                    exponent,
                    "must be a non-negative integer",
                ));
            }
        }
        LawDef::Bellow {
            m0_kg,
            fluid_density_kg_m3,
            radius_m,
        } => {
            finite("m0_kg", *m0_kg)?;
            finite("fluid_density_kg_m3", *fluid_density_kg_m3)?;
            finite("radius_m", *radius_m)?;
            if *fluid_density_kg_m3 < 0.0 {
                return Err(invalid(
                    format!("{field}.fluid_density_kg_m3"),
                    fluid_density_kg_m3,
                    "must be non-negative",
                ));
            }
            if *radius_m < 0.0 {
                return Err(invalid(format!("{field}.radius_m"), radius_m, "must be non-negative"));
            }
        }
        LawDef::Harmonic {
            dead_load,
            amplitude,
            frequency_hz,
        } => {
            finite("dead_load", *dead_load)?;
            finite("amplitude", *amplitude)?;
            finite("frequency_hz", *frequency_hz)?;
        }
        LawDef::HarmonicSweep {
            dead_load,
            amplitude,
            sweep_rate_s,
        } => {
            finite("dead_load", *dead_load)?;
            finite("amplitude", *amplitude)?;
            finite("sweep_rate_s", *sweep_rate_s)?;
            if *sweep_rate_s <= 0.0 {
                return Err(invalid(
                    format!("{field}.sweep_rate_s"),
                    sweep_rate_s,
                    "must be positive",
                ));
            }
        }
    }
    Ok(())
}

fn validate_time(scenario: &Scenario) -> Result<(), ValidationError> {
    let time = &scenario.time;
    if !time.t0.is_finite() {
        return Err(invalid("time.t0", time.t0, "must be finite"));
    }
    if !time.t_end.is_finite() || time.t_end <= time.t0 {
        return Err(invalid("time.t_end", time.t_end, "must be finite and greater than t0"));
    }
    Ok(())
}

fn validate_solver(scenario: &Scenario) -> Result<(), ValidationError> {
    let solver = &scenario.solver;
    if !(solver.atol.is_finite() && solver.atol > 0.0) {
        return Err(invalid("solver.atol", solver.atol, "must be positive"));
    }
    if !(solver.rtol.is_finite() && solver.rtol > 0.0) {
        return Err(invalid("solver.rtol", solver.rtol, "must be positive"));
    }
    match solver.dt {
        Some(dt) if !(dt.is_finite() && dt > 0.0) => {
            return Err(invalid("solver.dt", dt, "must be positive"));
        }
        None if !solver.method.is_adaptive() => {
            return Err(invalid(
                "solver.dt",
                "none",
                "fixed-step methods need a step size",
            ));
        }
        _ => {}
    }
    if solver.max_steps == 0 {
        return Err(invalid("solver.max_steps", 0, "must be positive"));
    }
    if solver.record_every == 0 {
        return Err(invalid("solver.record_every", 0, "must be positive"));
    }
    Ok(())
}

/// The starting point must be finite with positive mass. The rest of the
/// trajectory is the caller's responsibility (or the mass guard's).
fn validate_initial(scenario: &Scenario, model: &ModelDef) -> Result<(), ValidationError> {
    let base = build_msd(model);
    let t0 = scenario.time.t0;

    if let InitialDef::StaticDeflection { .. } = scenario.initial {
        let stiffness = base.elastic(1.0);
        if stiffness == 0.0 || !stiffness.is_finite() {
            return Err(ValidationError::Unsupported {
                feature: "StaticDeflection initial state".to_string(),
                reason: format!(
                    "needs a non-zero elastic force at x = 1 ({} law gives {stiffness})",
                    law_kind(&model.elastic)
                ),
            });
        }
    }

    let x0 = initial_state(&scenario.initial, &base, t0);
    if !x0.is_finite() {
        return Err(invalid("initial", format!("({}, {})", x0.x, x0.v), "must be finite"));
    }

    let mass = base.mass(x0.x);
    if !(mass.is_finite() && mass > 0.0) {
        return Err(invalid(
            "model.mass",
            mass,
            "mass at the initial position must be positive",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SolverDef, SweepDef, TimeSpanDef};
    use msd_sim::{IntegratorType, SweepDefinition, SweepType};

    fn scenario() -> Scenario {
        Scenario {
            version: LATEST_VERSION,
            name: "test".to_string(),
            description: None,
            model: ModelDef::default(),
            initial: InitialDef::State { x0: 0.0, v0: 1.0 },
            time: TimeSpanDef {
                t0: 0.0,
                t_end: 10.0,
            },
            solver: SolverDef::default(),
            sweep: None,
            output: None,
        }
    }

    #[test]
    fn default_scenario_is_valid() {
        validate_scenario(&scenario()).unwrap();
    }

    #[test]
    fn rejects_future_version() {
        let mut s = scenario();
        s.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_empty_span() {
        let mut s = scenario();
        s.time.t_end = 0.0;
        assert!(validate_scenario(&s).is_err());
    }

    #[test]
    fn rejects_bad_tolerances() {
        let mut s = scenario();
        s.solver.rtol = 0.0;
        assert!(validate_scenario(&s).is_err());

        let mut s = scenario();
        s.solver.atol = f64::NAN;
        assert!(validate_scenario(&s).is_err());
    }

    #[test]
    fn fixed_step_needs_dt() {
        let mut s = scenario();
        s.solver.method = IntegratorType::RK4;
        assert!(validate_scenario(&s).is_err());
        s.solver.dt = Some(0.01);
        validate_scenario(&s).unwrap();
    }

    #[test]
    fn rejects_fractional_exponent() {
        let mut s = scenario();
        s.model.elastic = LawDef::Power {
            coefficient: 1.0,
            exponent: 2.5,
        };
        let err = validate_scenario(&s).unwrap_err();
        assert!(err.to_string().contains("exponent"));
    }

    #[test]
    fn rejects_non_finite_coefficient() {
        let mut s = scenario();
        s.model.damping = LawDef::Polynomial {
            coefficients: vec![0.0, f64::INFINITY],
        };
        assert!(validate_scenario(&s).is_err());
    }

    #[test]
    fn rejects_non_positive_initial_mass() {
        let mut s = scenario();
        s.model.mass = LawDef::Linear {
            slope: 1.0,
            offset: 0.0,
        };
        // m(0) = 0
        assert!(validate_scenario(&s).is_err());
        s.initial = InitialDef::State { x0: 1.0, v0: 0.0 };
        validate_scenario(&s).unwrap();
    }

    #[test]
    fn static_deflection_needs_stiffness() {
        let mut s = scenario();
        s.initial = InitialDef::StaticDeflection { v0: 0.0 };
        s.model.elastic = LawDef::Constant { value: 0.0 };
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::Unsupported { .. })
        ));
    }

    #[test]
    fn sweep_checks() {
        let mut s = scenario();
        s.sweep = Some(SweepDef {
            parameter: SweepParameter::ElasticExponent,
            values: vec![],
            range: None,
        });
        assert!(validate_scenario(&s).is_err());

        s.sweep = Some(SweepDef {
            parameter: SweepParameter::ElasticExponent,
            values: vec![1.0, 3.5],
            range: None,
        });
        assert!(validate_scenario(&s).is_err());

        s.sweep = Some(SweepDef {
            parameter: SweepParameter::ElasticExponent,
            values: vec![1.0, 3.0, 5.0, 7.0],
            range: None,
        });
        validate_scenario(&s).unwrap();

        s.sweep = Some(SweepDef {
            parameter: SweepParameter::ForcingAmplitude,
            values: vec![1.0],
            range: None,
        });
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::Unsupported { .. })
        ));
    }

    #[test]
    fn sweep_values_and_range_are_exclusive() {
        let range = SweepDefinition::new(1.0, 5.0, 3, SweepType::Linear).unwrap();
        let mut s = scenario();
        s.sweep = Some(SweepDef {
            parameter: SweepParameter::ElasticExponent,
            values: vec![1.0, 3.0],
            range: Some(range.clone()),
        });
        match validate_scenario(&s) {
            Err(ValidationError::InvalidValue { field, .. }) => assert_eq!(field, "sweep"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }

        s.sweep = Some(SweepDef {
            parameter: SweepParameter::ElasticExponent,
            values: vec![],
            range: Some(range),
        });
        validate_scenario(&s).unwrap();
    }
}
