// math/mod.rs — scalar primitives shared by every sampler
//
// Small, pure helpers. Nothing here allocates or touches global state except
// the sine table in `trig`, which is built once and read-only afterwards.

pub mod trig;

/// Default tolerance for [`equals`].
pub const EPSILON: f64 = 1.0e-9;

/// Floor to an integer lattice coordinate.
///
/// Faster than `x.floor() as i64` on the hot path because it avoids the
/// libm call; identical for every finite input in `i64` range.
#[inline(always)]
pub fn floor(x: f64) -> i64 {
    let xi = x as i64;
    if x < xi as f64 {
        xi - 1
    } else {
        xi
    }
}

/// Clamp `value` into `[min, max]`.
#[inline(always)]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Clamp into the canonical noise range `[-1, 1]`.
#[inline(always)]
pub fn clamp_unit(value: f64) -> f64 {
    clamp(value, -1.0, 1.0)
}

/// Linear interpolation from `a` (t = 0) to `b` (t = 1).
#[inline(always)]
pub fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Tolerance equality using [`EPSILON`].
#[inline]
pub fn equals(a: f64, b: f64) -> bool {
    equals_eps(a, b, EPSILON)
}

/// Tolerance equality with an explicit epsilon.
#[inline]
pub fn equals_eps(a: f64, b: f64, epsilon: f64) -> bool {
    a == b || (a - b).abs() < epsilon
}

/// Map a value in `[-1, 1]` to a bucket index in `0..size`.
///
/// Out-of-range inputs land in the first or last bucket.
pub fn normalize_index(val: f64, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    let idx = floor(((val + 1.0) / 2.0) * size as f64);
    idx.clamp(0, size as i64 - 1) as usize
}

/// Scale, bias and saturate `x` from `[edge0, edge1]` into `[0, 1]`.
pub fn normalize_to_range(edge0: f64, edge1: f64, x: f64) -> f64 {
    clamp((x - edge0) / (edge1 - edge0), 0.0, 1.0)
}
