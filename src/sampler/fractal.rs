// sampler/fractal.rs — Brownian-motion octave accumulator
//
// Samples one input at increasing frequency and decreasing amplitude and sums
// the octaves. Each octave uses the next seed (seed, seed+1, ...) so octaves
// are decorrelated but reproducible from the root seed.
//
// Weighted strength feeds each octave's value back into the amplitude of the
// next one: 0 is a plain sum, 1 lets low octave values suppress later detail.
//
// The 2D and 3D paths differ in how they map an octave value into [0, 1]
// for the weighting: 2D clamps `noise + 1` at 2, 3D does not. Both forms are
// kept as-is in the scalar and derivative paths.

use super::{check_frequency, Sampler};
use crate::error::{SamplerError, SamplerResult};
use crate::math;
use serde::{Deserialize, Serialize};

/// Octave parameters for [`Fractal`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct FractalParams {
    pub octaves: u32,
    /// Per-octave frequency multiplier.
    pub lacunarity: f64,
    /// Per-octave amplitude multiplier.
    pub gain: f64,
    pub weighted_strength: f64,
    /// Applied to the query coordinates before the first octave.
    pub frequency: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        FractalParams {
            octaves: 3,
            lacunarity: 2.0,
            gain: 0.5,
            weighted_strength: 0.0,
            frequency: 1.0,
        }
    }
}

impl FractalParams {
    /// # Errors
    ///
    /// Rejects zero octaves, non-positive or non-finite lacunarity, gain or
    /// frequency, and a weighted strength outside `[0, 1]`.
    pub fn validate(&self) -> SamplerResult<()> {
        if self.octaves < 1 {
            return Err(SamplerError::InvalidOctaves(self.octaves));
        }
        if !(self.lacunarity.is_finite() && self.lacunarity > 0.0) {
            return Err(SamplerError::InvalidLacunarity(self.lacunarity));
        }
        if !(self.gain.is_finite() && self.gain > 0.0) {
            return Err(SamplerError::InvalidGain(self.gain));
        }
        if !(0.0..=1.0).contains(&self.weighted_strength) {
            return Err(SamplerError::InvalidWeightedStrength(self.weighted_strength));
        }
        check_frequency(self.frequency)?;
        Ok(())
    }

    /// Reciprocal of the summed octave amplitudes `1 + gain + gain² + ...`,
    /// so the first octave's amplitude keeps the total bounded.
    pub fn fractal_bounding(&self) -> f64 {
        let gain = self.gain.abs();
        let mut amp = gain;
        let mut amp_fractal = 1.0;
        for _ in 1..self.octaves {
            amp_fractal += amp;
            amp *= gain;
        }
        1.0 / amp_fractal
    }
}

/// Fractal Brownian motion over one owned input.
#[derive(Debug, Clone)]
pub struct Fractal {
    input: Box<Sampler>,
    params: FractalParams,
    fractal_bounding: f64,
}

impl Fractal {
    pub fn new(input: Sampler, params: FractalParams) -> SamplerResult<Self> {
        params.validate()?;
        Ok(Fractal {
            input: Box::new(input),
            fractal_bounding: params.fractal_bounding(),
            params,
        })
    }

    pub fn input(&self) -> &Sampler {
        &self.input
    }

    pub fn params(&self) -> &FractalParams {
        &self.params
    }

    pub fn fractal_bounding(&self) -> f64 {
        self.fractal_bounding
    }

    /// Replace all parameters, recomputing the bounding constant.
    pub fn set_params(&mut self, params: FractalParams) -> SamplerResult<()> {
        params.validate()?;
        self.fractal_bounding = params.fractal_bounding();
        self.params = params;
        Ok(())
    }

    pub fn set_frequency(&mut self, frequency: f64) -> SamplerResult<()> {
        self.params.frequency = check_frequency(frequency)?;
        Ok(())
    }

    // ── Scalar ──────────────────────────────────────────────────────

    pub fn sample_2d(&self, seed: i64, x: f64, y: f64) -> f64 {
        let p = &self.params;
        let (mut x, mut y) = (x * p.frequency, y * p.frequency);
        let mut seed = seed;
        let mut sum = 0.0;
        let mut amp = self.fractal_bounding;

        for _ in 0..p.octaves {
            let noise = self.input.sample_2d(seed, x, y);
            seed = seed.wrapping_add(1);
            sum += noise * amp;
            amp *= math::lerp(p.weighted_strength, 1.0, (noise + 1.0).min(2.0) * 0.5);

            x *= p.lacunarity;
            y *= p.lacunarity;
            amp *= p.gain;
        }

        sum
    }

    pub fn sample_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> f64 {
        let p = &self.params;
        let (mut x, mut y, mut z) = (x * p.frequency, y * p.frequency, z * p.frequency);
        let mut seed = seed;
        let mut sum = 0.0;
        let mut amp = self.fractal_bounding;

        for _ in 0..p.octaves {
            let noise = self.input.sample_3d(seed, x, y, z);
            seed = seed.wrapping_add(1);
            sum += noise * amp;
            amp *= math::lerp(p.weighted_strength, 1.0, (noise + 1.0) * 0.5);

            x *= p.lacunarity;
            y *= p.lacunarity;
            z *= p.lacunarity;
            amp *= p.gain;
        }

        sum
    }

    // ── Derivative ──────────────────────────────────────────────────
    //
    // Sum rule across octaves, product rule within one: the octave's partials
    // are scaled by the current amplitude, which is constant for that octave.

    pub(crate) fn derivative_2d(&self, seed: i64, x: f64, y: f64) -> [f64; 3] {
        let p = &self.params;
        let (mut x, mut y) = (x * p.frequency, y * p.frequency);
        let mut seed = seed;
        let mut sum = [0.0; 3];
        let mut amp = self.fractal_bounding;

        for _ in 0..p.octaves {
            let noise = self.input.derivative_2d(seed, x, y);
            seed = seed.wrapping_add(1);
            for (s, n) in sum.iter_mut().zip(noise) {
                *s += n * amp;
            }
            amp *= math::lerp(p.weighted_strength, 1.0, (noise[0] + 1.0).min(2.0) * 0.5);

            x *= p.lacunarity;
            y *= p.lacunarity;
            amp *= p.gain;
        }

        sum
    }

    pub(crate) fn derivative_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> [f64; 4] {
        let p = &self.params;
        let (mut x, mut y, mut z) = (x * p.frequency, y * p.frequency, z * p.frequency);
        let mut seed = seed;
        let mut sum = [0.0; 4];
        let mut amp = self.fractal_bounding;

        for _ in 0..p.octaves {
            let noise = self.input.derivative_3d(seed, x, y, z);
            seed = seed.wrapping_add(1);
            for (s, n) in sum.iter_mut().zip(noise) {
                *s += n * amp;
            }
            amp *= math::lerp(p.weighted_strength, 1.0, (noise[0] + 1.0) * 0.5);

            x *= p.lacunarity;
            y *= p.lacunarity;
            z *= p.lacunarity;
            amp *= p.gain;
        }

        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::noise::{simplex_2d, simplex_3d, Simplex};

    fn simplex() -> Sampler {
        Simplex::new(1.0).unwrap().into()
    }

    #[test]
    fn default_params_are_valid() {
        let p = FractalParams::default();
        assert!(p.validate().is_ok());
        // 1 / (1 + 0.5 + 0.25)
        assert!((p.fractal_bounding() - 1.0 / 1.75).abs() < 1e-15);
    }

    #[test]
    fn invalid_params_rejected() {
        let base = FractalParams::default();
        let cases = [
            (FractalParams { octaves: 0, ..base }, SamplerError::InvalidOctaves(0)),
            (
                FractalParams { lacunarity: 0.0, ..base },
                SamplerError::InvalidLacunarity(0.0),
            ),
            (FractalParams { gain: -0.5, ..base }, SamplerError::InvalidGain(-0.5)),
            (
                FractalParams { weighted_strength: 1.5, ..base },
                SamplerError::InvalidWeightedStrength(1.5),
            ),
            (
                FractalParams { frequency: 0.0, ..base },
                SamplerError::InvalidFrequency(0.0),
            ),
        ];
        for (params, expected) in cases {
            assert_eq!(Fractal::new(simplex(), params).unwrap_err(), expected);
        }
    }

    #[test]
    fn single_octave_is_scaled_input() {
        let params = FractalParams {
            octaves: 1,
            lacunarity: 3.0,
            gain: 0.25,
            weighted_strength: 0.7,
            frequency: 1.0,
        };
        let f = Fractal::new(simplex(), params).unwrap();
        assert_eq!(f.fractal_bounding(), 1.0);
        for i in 0..50 {
            let (x, y, z) = (i as f64 * 0.31 - 4.0, i as f64 * 0.17 + 2.0, i as f64 * -0.23);
            assert_eq!(
                f.sample_2d(11, x, y),
                simplex_2d(11, x, y) * f.fractal_bounding()
            );
            assert_eq!(
                f.sample_3d(11, x, y, z),
                simplex_3d(11, x, y, z) * f.fractal_bounding()
            );
        }
    }

    #[test]
    fn octaves_use_successive_seeds() {
        let params = FractalParams {
            octaves: 2,
            lacunarity: 2.0,
            gain: 0.5,
            weighted_strength: 0.0,
            frequency: 1.0,
        };
        let f = Fractal::new(simplex(), params).unwrap();
        let b = f.fractal_bounding();
        let (x, y) = (0.37, -1.91);
        let expected = 0.0 + simplex_2d(5, x, y) * b + simplex_2d(6, x * 2.0, y * 2.0) * (b * 0.5);
        assert_eq!(f.sample_2d(5, x, y), expected);
    }

    #[test]
    fn seed_wraps_at_i64_max() {
        let f = Fractal::new(simplex(), FractalParams::default()).unwrap();
        let v = f.sample_2d(i64::MAX, 1.0, 2.0);
        assert!(v.is_finite());
    }

    #[test]
    fn weighted_2d_clamps_but_3d_does_not() {
        // A constant input above 1 exposes the clamp in the 2D weighting.
        let params = FractalParams {
            octaves: 2,
            lacunarity: 2.0,
            gain: 1.0,
            weighted_strength: 1.0,
            frequency: 1.0,
        };
        let f = Fractal::new(Sampler::constant(3.0), params).unwrap();
        let b = f.fractal_bounding();
        assert_eq!(b, 0.5);
        // 2D: amp after octave 1 = b * min(4, 2) * 0.5 = b
        assert_eq!(f.sample_2d(0, 0.0, 0.0), 3.0 * b + 3.0 * b);
        // 3D: amp after octave 1 = b * 4 * 0.5 = 2b
        assert_eq!(f.sample_3d(0, 0.0, 0.0, 0.0), 3.0 * b + 3.0 * (2.0 * b));
    }

    #[test]
    fn derivative_value_matches_scalar_path() {
        let params = FractalParams {
            octaves: 5,
            weighted_strength: 0.4,
            ..FractalParams::default()
        };
        let f = Fractal::new(simplex(), params).unwrap();
        for i in 0..40 {
            let (x, y, z) = (i as f64 * 0.21, i as f64 * -0.43, i as f64 * 0.11 + 1.0);
            let d2 = f.derivative_2d(8, x, y);
            assert!((d2[0] - f.sample_2d(8, x, y)).abs() < 1e-12);
            let d3 = f.derivative_3d(8, x, y, z);
            assert!((d3[0] - f.sample_3d(8, x, y, z)).abs() < 1e-12);
        }
    }

    #[test]
    fn derivative_partials_are_amplitude_weighted_sums() {
        let params = FractalParams {
            octaves: 3,
            lacunarity: 2.0,
            gain: 0.5,
            weighted_strength: 0.0,
            frequency: 1.0,
        };
        let input = Simplex::new(1.0).unwrap();
        let f = Fractal::new(input.clone().into(), params).unwrap();
        let (x, y) = (1.3, -0.6);
        let mut expected = [0.0; 3];
        let mut amp = f.fractal_bounding();
        let mut scale = 1.0;
        for octave in 0..3 {
            let d = input.derivative_2d(4 + octave, x * scale, y * scale);
            for k in 0..3 {
                expected[k] += d[k] * amp;
            }
            amp *= 0.5;
            scale *= 2.0;
        }
        assert_eq!(f.derivative_2d(4, x, y), expected);
    }

    #[test]
    fn set_params_recomputes_bounding() {
        let mut f = Fractal::new(simplex(), FractalParams::default()).unwrap();
        f.set_params(FractalParams {
            octaves: 1,
            ..FractalParams::default()
        })
        .unwrap();
        assert_eq!(f.fractal_bounding(), 1.0);
        assert!(f
            .set_params(FractalParams {
                gain: 0.0,
                ..FractalParams::default()
            })
            .is_err());
        assert_eq!(f.params().octaves, 1);
    }
}
