// sampler/config.rs — serde parameter tree → validated sampler tree
//
// A `SamplerConfig` describes an already-resolved tree: children inline,
// parameters as plain numbers. `build` runs every constructor's validation,
// so a config either becomes a queryable tree or fails before any sample is
// taken.
//
// Field names are PascalCase and the node kind is carried in "type", e.g.
//
//   { "type": "Fractal", "Octaves": 4, "Input": { "type": "Simplex" } }

use super::arithmetic::{ArithmeticOp, BinaryArithmetic};
use super::fractal::{Fractal, FractalParams};
use super::kernel::Kernel;
use super::noise::{Simplex, Sine};
use super::normalizer::Normalizer;
use super::Sampler;
use crate::error::SamplerResult;
use serde::{Deserialize, Serialize};

fn default_frequency() -> f64 {
    1.0
}

fn default_octaves() -> u32 {
    FractalParams::default().octaves
}

fn default_lacunarity() -> f64 {
    FractalParams::default().lacunarity
}

fn default_gain() -> f64 {
    FractalParams::default().gain
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SamplerConfig {
    Constant {
        #[serde(rename = "Value")]
        value: f64,
    },
    Simplex {
        #[serde(rename = "Frequency", default = "default_frequency")]
        frequency: f64,
    },
    Sine {
        #[serde(rename = "Frequency", default = "default_frequency")]
        frequency: f64,
    },
    Arithmetic {
        #[serde(rename = "Operator")]
        op: ArithmeticOp,
        #[serde(rename = "Left")]
        left: Box<SamplerConfig>,
        #[serde(rename = "Right")]
        right: Box<SamplerConfig>,
    },
    Fractal {
        #[serde(rename = "Input")]
        input: Box<SamplerConfig>,
        #[serde(rename = "Octaves", default = "default_octaves")]
        octaves: u32,
        #[serde(rename = "Lacunarity", default = "default_lacunarity")]
        lacunarity: f64,
        #[serde(rename = "Gain", default = "default_gain")]
        gain: f64,
        #[serde(rename = "WeightedStrength", default)]
        weighted_strength: f64,
        #[serde(rename = "Frequency", default = "default_frequency")]
        frequency: f64,
    },
    Kernel {
        #[serde(rename = "Input")]
        input: Box<SamplerConfig>,
        #[serde(rename = "Kernel")]
        kernel: Vec<Vec<f64>>,
        #[serde(rename = "Frequency", default = "default_frequency")]
        frequency: f64,
    },
    LinearNormalizer {
        #[serde(rename = "Input")]
        input: Box<SamplerConfig>,
        #[serde(rename = "Min")]
        min: f64,
        #[serde(rename = "Max")]
        max: f64,
    },
}

impl SamplerConfig {
    /// Validate and build the described tree.
    ///
    /// # Errors
    ///
    /// The first [`SamplerError`](crate::error::SamplerError) raised by any
    /// node constructor, depth-first.
    pub fn build(&self) -> SamplerResult<Sampler> {
        let sampler = match self {
            SamplerConfig::Constant { value } => Sampler::constant(*value),
            SamplerConfig::Simplex { frequency } => Simplex::new(*frequency)?.into(),
            SamplerConfig::Sine { frequency } => Sine::new(*frequency)?.into(),
            SamplerConfig::Arithmetic { op, left, right } => {
                BinaryArithmetic::new(*op, left.build()?, right.build()?).into()
            }
            SamplerConfig::Fractal {
                input,
                octaves,
                lacunarity,
                gain,
                weighted_strength,
                frequency,
            } => {
                let params = FractalParams {
                    octaves: *octaves,
                    lacunarity: *lacunarity,
                    gain: *gain,
                    weighted_strength: *weighted_strength,
                    frequency: *frequency,
                };
                Fractal::new(input.build()?, params)?.into()
            }
            SamplerConfig::Kernel {
                input,
                kernel,
                frequency,
            } => Kernel::new(input.build()?, kernel)?
                .with_frequency(*frequency)?
                .into(),
            SamplerConfig::LinearNormalizer { input, min, max } => {
                Normalizer::new(input.build()?, *min, *max)?.into()
            }
        };
        log::trace!("built {} sampler", self.kind());
        Ok(sampler)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SamplerConfig::Constant { .. } => "Constant",
            SamplerConfig::Simplex { .. } => "Simplex",
            SamplerConfig::Sine { .. } => "Sine",
            SamplerConfig::Arithmetic { op, .. } => op.name(),
            SamplerConfig::Fractal { .. } => "Fractal",
            SamplerConfig::Kernel { .. } => "Kernel",
            SamplerConfig::LinearNormalizer { .. } => "LinearNormalizer",
        }
    }
}
