//! Built-in scenarios reproducing the reference experiments.

use msd_sim::IntegratorType;

use crate::schema::{
    InitialDef, LATEST_VERSION, LawDef, MassRateArgumentDef, MassRateDef, ModelDef, OutputDef,
    Scenario, SolverDef, SweepDef, SweepParameter, TimeSpanDef,
};
use crate::{ProjectError, ProjectResult};

pub const BUILTIN_NAMES: [&str; 4] = ["baseline", "bellow", "momentum", "stiffening"];

pub fn builtin(name: &str) -> ProjectResult<Scenario> {
    match name {
        "baseline" => Ok(baseline()),
        "bellow" => Ok(bellow()),
        "momentum" => Ok(momentum()),
        "stiffening" => Ok(stiffening()),
        _ => Err(ProjectError::UnknownBuiltin {
            name: name.to_string(),
        }),
    }
}

fn tight_solver() -> SolverDef {
    SolverDef {
        method: IntegratorType::DormandPrince45,
        atol: 1e-10,
        rtol: 1e-10,
        ..SolverDef::default()
    }
}

fn output(stem: &str, title: &str) -> Option<OutputDef> {
    Some(OutputDef {
        csv: Some(format!("{stem}.csv")),
        plot: Some(format!("{stem}.png")),
        title: Some(title.to_string()),
    })
}

/// Default oscillator kicked with unit velocity.
fn baseline() -> Scenario {
    Scenario {
        version: LATEST_VERSION,
        name: "baseline".to_string(),
        description: Some("Unit mass, unit spring, damping 0.1, released with v0 = 1".to_string()),
        model: ModelDef::default(),
        initial: InitialDef::State { x0: 0.0, v0: 1.0 },
        time: TimeSpanDef {
            t0: 0.0,
            t_end: 100.0,
        },
        solver: tight_solver(),
        sweep: None,
        output: output("baseline", "Damped oscillator"),
    }
}

/// Fluid-filled bellow under a preload and a slow frequency sweep.
fn bellow() -> Scenario {
    Scenario {
        version: LATEST_VERSION,
        name: "bellow".to_string(),
        description: Some(
            "Bellow of radius 1 cm holding a water column, 100 N preload, 1 N harmonic sweep"
                .to_string(),
        ),
        model: ModelDef {
            mass: LawDef::Bellow {
                m0_kg: 1e-3,
                fluid_density_kg_m3: 1000.0,
                radius_m: 0.01,
            },
            elastic: LawDef::Linear {
                slope: 40.0,
                offset: 0.0,
            },
            damping: LawDef::Linear {
                slope: 0.01,
                offset: 0.0,
            },
            forcing: LawDef::HarmonicSweep {
                dead_load: 100.0,
                amplitude: 1.0,
                sweep_rate_s: 10_000.0,
            },
            mass_rate: None,
            mass_guard: false,
        },
        initial: InitialDef::StaticDeflection { v0: 0.0 },
        time: TimeSpanDef {
            t0: 5000.0,
            t_end: 8000.0,
        },
        solver: SolverDef::default(),
        sweep: None,
        output: output("bellow", "Bellow frequency sweep"),
    }
}

/// Growing mass with the dm/dt·v inertial correction.
fn momentum() -> Scenario {
    Scenario {
        version: LATEST_VERSION,
        name: "momentum".to_string(),
        description: Some("m = 1e-6 + 0.1·x with dm/dt = 0.1·v, small harmonic sweep".to_string()),
        model: ModelDef {
            mass: LawDef::Linear {
                slope: 0.1,
                offset: 1e-6,
            },
            damping: LawDef::Linear {
                slope: 0.01,
                offset: 0.0,
            },
            forcing: LawDef::HarmonicSweep {
                dead_load: 10.0,
                amplitude: 0.1,
                sweep_rate_s: 10_000.0,
            },
            mass_rate: Some(MassRateDef {
                law: LawDef::Linear {
                    slope: 0.1,
                    offset: 0.0,
                },
                argument: MassRateArgumentDef::Velocity,
            }),
            ..ModelDef::default()
        },
        initial: InitialDef::State { x0: 10.0, v0: 0.0 },
        time: TimeSpanDef {
            t0: 0.0,
            t_end: 2000.0,
        },
        solver: tight_solver(),
        sweep: None,
        output: output("momentum", "Momentum-based model"),
    }
}

/// Springs of increasing nonlinearity, x^p for p = 1, 3, 5, 7.
fn stiffening() -> Scenario {
    Scenario {
        version: LATEST_VERSION,
        name: "stiffening".to_string(),
        description: Some("Comparison of stiffening springs".to_string()),
        model: ModelDef {
            elastic: LawDef::Power {
                coefficient: 1.0,
                exponent: 1.0,
            },
            ..ModelDef::default()
        },
        initial: InitialDef::State { x0: 0.0, v0: 1.0 },
        time: TimeSpanDef {
            t0: 0.0,
            t_end: 100.0,
        },
        solver: tight_solver(),
        sweep: Some(SweepDef {
            parameter: SweepParameter::ElasticExponent,
            values: vec![1.0, 3.0, 5.0, 7.0],
            range: None,
        }),
        output: Some(OutputDef {
            csv: None,
            plot: Some("stiffening.png".to_string()),
            title: Some("Stiffening springs".to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_scenario;

    #[test]
    fn all_builtins_validate() {
        for name in BUILTIN_NAMES {
            let scenario = builtin(name).unwrap();
            assert_eq!(scenario.name, name);
            validate_scenario(&scenario).unwrap();
        }
    }

    #[test]
    fn unknown_builtin() {
        assert!(matches!(
            builtin("pendulum"),
            Err(ProjectError::UnknownBuiltin { .. })
        ));
    }
}
