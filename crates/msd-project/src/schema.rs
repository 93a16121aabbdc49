//! Scenario schema definitions.

use msd_sim::{IntegratorType, SweepDefinition};
use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub model: ModelDef,
    pub initial: InitialDef,
    pub time: TimeSpanDef,
    #[serde(default)]
    pub solver: SolverDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<SweepDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputDef>,
}

/// Force and mass laws of the oscillator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDef {
    #[serde(default = "default_mass")]
    pub mass: LawDef,
    #[serde(default = "default_elastic")]
    pub elastic: LawDef,
    #[serde(default = "default_damping")]
    pub damping: LawDef,
    #[serde(default = "default_forcing")]
    pub forcing: LawDef,
    /// Present for the momentum-based model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_rate: Option<MassRateDef>,
    #[serde(default)]
    pub mass_guard: bool,
}

impl Default for ModelDef {
    fn default() -> Self {
        Self {
            mass: default_mass(),
            elastic: default_elastic(),
            damping: default_damping(),
            forcing: default_forcing(),
            mass_rate: None,
            mass_guard: false,
        }
    }
}

fn default_mass() -> LawDef {
    LawDef::Constant { value: 1.0 }
}

fn default_elastic() -> LawDef {
    LawDef::Linear {
        slope: 1.0,
        offset: 0.0,
    }
}

fn default_damping() -> LawDef {
    LawDef::Linear {
        slope: 0.1,
        offset: 0.0,
    }
}

fn default_forcing() -> LawDef {
    LawDef::Constant { value: 0.0 }
}

/// Scalar law; the argument is x, v or t depending on where it is used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum LawDef {
    Constant {
        value: f64,
    },
    /// offset + slope · x
    Linear {
        slope: f64,
        #[serde(default)]
        offset: f64,
    },
    /// Σ cᵢ·xⁱ, ascending powers.
    Polynomial {
        coefficients: Vec<f64>,
    },
    /// coefficient · x^exponent, with a non-negative integer exponent.
    Power {
        coefficient: f64,
        exponent: f64,
    },
    /// Bellow plus fluid column: m0 + ρ·πr²·x.
    Bellow {
        m0_kg: f64,
        fluid_density_kg_m3: f64,
        radius_m: f64,
    },
    /// f0 + fh·sin(2π·f·t)
    Harmonic {
        dead_load: f64,
        amplitude: f64,
        frequency_hz: f64,
    },
    /// f0 + fh·sin(2π·(t/s)·t)
    HarmonicSweep {
        dead_load: f64,
        amplitude: f64,
        sweep_rate_s: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MassRateDef {
    pub law: LawDef,
    #[serde(default)]
    pub argument: MassRateArgumentDef,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum MassRateArgumentDef {
    #[default]
    Velocity,
    Displacement,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum InitialDef {
    State {
        x0: f64,
        v0: f64,
    },
    /// x0 = f(t0) / e(1.0), the deflection under the load present at t0.
    StaticDeflection {
        #[serde(default)]
        v0: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSpanDef {
    #[serde(default)]
    pub t0: f64,
    pub t_end: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverDef {
    #[serde(default)]
    pub method: IntegratorType,
    #[serde(default = "default_tolerance")]
    pub atol: f64,
    #[serde(default = "default_tolerance")]
    pub rtol: f64,
    /// Fixed step, or initial step for the adaptive method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<f64>,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            method: IntegratorType::default(),
            atol: default_tolerance(),
            rtol: default_tolerance(),
            dt: None,
            max_steps: default_max_steps(),
            record_every: default_record_every(),
        }
    }
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_max_steps() -> usize {
    1_000_000
}

fn default_record_every() -> usize {
    1
}

/// Independent runs over one model parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepDef {
    pub parameter: SweepParameter,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
    /// Alternative to `values`: a generated range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<SweepDefinition>,
}

impl SweepDef {
    /// Explicit values when given, otherwise the generated range.
    pub fn points(&self) -> Vec<f64> {
        if !self.values.is_empty() {
            return self.values.clone();
        }
        self.range
            .as_ref()
            .map(SweepDefinition::generate_points)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SweepParameter {
    /// Exponent p of the elastic law k·x^p.
    ElasticExponent,
    /// Linear stiffness k.
    ElasticStiffness,
    /// Linear damping coefficient c.
    DampingCoefficient,
    /// Harmonic amplitude fh of the forcing.
    ForcingAmplitude,
}

impl SweepParameter {
    pub fn label(self) -> &'static str {
        match self {
            SweepParameter::ElasticExponent => "Power",
            SweepParameter::ElasticStiffness => "k",
            SweepParameter::DampingCoefficient => "c",
            SweepParameter::ForcingAmplitude => "fh",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
