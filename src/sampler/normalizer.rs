// sampler/normalizer.rs — linear range remapping
//
// Maps `[min, max]` onto the canonical noise range `[-1, 1]`:
//
//   normalize(v) = (v - min) * (2 / (max - min)) - 1
//
// This is the direction that brings external data into the range every other
// sampler assumes, not the other way round.
//
// The formula is evaluated in one of two algebraically equal forms so that
// the fixed points come out exact in floating point:
//
//   symmetric bounds (min == -max):  v / max
//   otherwise:                       ((v - min) - (max - v)) / (max - min)
//
// The first is the identity for [-1, 1], down to subnormal inputs. The second
// maps `min` to exactly -1 and `max` to exactly 1 for any bounds. Elsewhere
// the result is within a few ulps of the real-number value.

use super::Sampler;
use crate::error::{SamplerError, SamplerResult};

#[derive(Debug, Clone)]
pub struct Normalizer {
    sampler: Box<Sampler>,
    min: f64,
    max: f64,
    // max - min, finite and > 0
    span: f64,
    symmetric: bool,
}

impl Normalizer {
    /// # Errors
    ///
    /// Returns [`SamplerError::InvalidBounds`] unless both bounds are finite,
    /// `min < max`, and `max - min` does not overflow.
    pub fn new(sampler: Sampler, min: f64, max: f64) -> SamplerResult<Self> {
        let span = max - min;
        if !(min.is_finite() && max.is_finite() && min < max && span.is_finite()) {
            return Err(SamplerError::InvalidBounds { min, max });
        }
        Ok(Normalizer {
            sampler: Box::new(sampler),
            min,
            max,
            span,
            symmetric: min == -max,
        })
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    #[inline(always)]
    pub fn normalize(&self, value: f64) -> f64 {
        if self.symmetric {
            value / self.max
        } else {
            ((value - self.min) - (self.max - value)) / self.span
        }
    }

    /// Scale one partial derivative by `2 / (max - min)`.
    #[inline(always)]
    fn slope(&self, partial: f64) -> f64 {
        if self.symmetric {
            partial / self.max
        } else {
            (2.0 * partial) / self.span
        }
    }

    #[inline]
    pub fn sample_2d(&self, seed: i64, x: f64, y: f64) -> f64 {
        self.normalize(self.sampler.sample_2d(seed, x, y))
    }

    #[inline]
    pub fn sample_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> f64 {
        self.normalize(self.sampler.sample_3d(seed, x, y, z))
    }

    pub(crate) fn derivative_2d(&self, seed: i64, x: f64, y: f64) -> [f64; 3] {
        let [v, dx, dy] = self.sampler.derivative_2d(seed, x, y);
        [self.normalize(v), self.slope(dx), self.slope(dy)]
    }

    pub(crate) fn derivative_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> [f64; 4] {
        let [v, dx, dy, dz] = self.sampler.derivative_3d(seed, x, y, z);
        [
            self.normalize(v),
            self.slope(dx),
            self.slope(dy),
            self.slope(dz),
        ]
    }
}
