// sampler/noise.rs — leaf samplers
//
// `Simplex` is seed-hashed gradient noise with analytic gradients. Corner
// gradients are picked by hashing (seed, lattice point) instead of a
// per-seed permutation table, so changing the seed per octave costs nothing.
//
// `Sine` is the periodic primitive; it reads the shared sine table.
//
// Both leaves scale their input by `frequency` before evaluation. Partial
// derivatives are reported in that scaled space.

use super::check_frequency;
use crate::error::SamplerResult;
use crate::math::{self, trig};

// ── Gradient vectors ────────────────────────────────────────────────

// 2D: 8 gradient directions (cardinal + diagonal, unnormalized)
const GRAD2: [[f64; 2]; 8] = [
    [1.0, 0.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [0.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [-1.0, -1.0],
];

// 3D: 12 gradient directions (edges of a cube)
const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

// ── Lattice hashing ─────────────────────────────────────────────────

const PRIME_X: i64 = 501_125_321;
const PRIME_Y: i64 = 1_136_930_381;
const PRIME_Z: i64 = 1_720_413_743;
const HASH_MULTIPLIER: i64 = 0x27d4_eb2d;

/// Hash a seed with pre-multiplied lattice coordinates into `0..count`.
#[inline(always)]
fn gradient_index(seed: i64, xp: i64, yp: i64, zp: i64, count: u64) -> usize {
    let mut h = (seed ^ xp ^ yp ^ zp).wrapping_mul(HASH_MULTIPLIER);
    h ^= h >> 15;
    ((h as u64) % count) as usize
}

#[inline(always)]
fn grad2(seed: i64, xp: i64, yp: i64) -> [f64; 2] {
    GRAD2[gradient_index(seed, xp, yp, 0, 8)]
}

#[inline(always)]
fn grad3(seed: i64, xp: i64, yp: i64, zp: i64) -> [f64; 3] {
    GRAD3[gradient_index(seed, xp, yp, zp, 12)]
}

// ── 2D Simplex ──────────────────────────────────────────────────────

// F2 = (sqrt(3) - 1) / 2
// G2 = (3 - sqrt(3)) / 6
const F2: f64 = 0.366_025_403_784_438_6;
const G2: f64 = 0.211_324_865_405_187_1;

/// Simplex cell for a 2D point: corner offsets and hashed gradients.
struct Cell2 {
    offsets: [[f64; 2]; 3],
    grads: [[f64; 2]; 3],
}

#[inline(always)]
fn cell_2d(seed: i64, x: f64, y: f64) -> Cell2 {
    // Skew input to simplex cell coordinates
    let s = (x + y) * F2;
    let i = math::floor(x + s);
    let j = math::floor(y + s);

    // Unskew to find cell origin in input space
    let t = (i + j) as f64 * G2;
    let x0 = x - (i as f64 - t);
    let y0 = y - (j as f64 - t);

    // Upper or lower triangle
    let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

    let ip = i.wrapping_mul(PRIME_X);
    let jp = j.wrapping_mul(PRIME_Y);

    Cell2 {
        offsets: [
            [x0, y0],
            [x0 - i1 as f64 + G2, y0 - j1 as f64 + G2],
            [x0 - 1.0 + 2.0 * G2, y0 - 1.0 + 2.0 * G2],
        ],
        grads: [
            grad2(seed, ip, jp),
            grad2(seed, ip.wrapping_add(i1 * PRIME_X), jp.wrapping_add(j1 * PRIME_Y)),
            grad2(seed, ip.wrapping_add(PRIME_X), jp.wrapping_add(PRIME_Y)),
        ],
    }
}

/// 2D simplex noise in approximately `[-1, 1]`.
pub fn simplex_2d(seed: i64, x: f64, y: f64) -> f64 {
    let cell = cell_2d(seed, x, y);
    let mut n = 0.0;
    for (o, g) in cell.offsets.iter().zip(&cell.grads) {
        let t = 0.5 - o[0] * o[0] - o[1] * o[1];
        if t >= 0.0 {
            let t2 = t * t;
            n += t2 * t2 * (g[0] * o[0] + g[1] * o[1]);
        }
    }
    70.0 * n
}

/// 2D simplex noise with its analytic gradient: `[value, ∂x, ∂y]`.
pub fn simplex_2d_with_gradient(seed: i64, x: f64, y: f64) -> [f64; 3] {
    let cell = cell_2d(seed, x, y);
    let mut value = 0.0;
    let mut gdx = 0.0;
    let mut gdy = 0.0;
    for (o, g) in cell.offsets.iter().zip(&cell.grads) {
        let t = 0.5 - o[0] * o[0] - o[1] * o[1];
        if t >= 0.0 {
            let dot = g[0] * o[0] + g[1] * o[1];
            let t2 = t * t;
            let t4 = t2 * t2;
            value += t4 * dot;
            // d(t⁴·dot) = t⁴·g + 4t³·(-2o)·dot
            gdx += t4 * g[0] + 4.0 * t2 * t * (-2.0 * o[0]) * dot;
            gdy += t4 * g[1] + 4.0 * t2 * t * (-2.0 * o[1]) * dot;
        }
    }
    [70.0 * value, 70.0 * gdx, 70.0 * gdy]
}

// ── 3D Simplex ──────────────────────────────────────────────────────

const F3: f64 = 1.0 / 3.0;
const G3: f64 = 1.0 / 6.0;

struct Cell3 {
    offsets: [[f64; 3]; 4],
    grads: [[f64; 3]; 4],
}

#[inline(always)]
fn cell_3d(seed: i64, x: f64, y: f64, z: f64) -> Cell3 {
    let s = (x + y + z) * F3;
    let i = math::floor(x + s);
    let j = math::floor(y + s);
    let k = math::floor(z + s);

    let t = (i + j + k) as f64 * G3;
    let x0 = x - (i as f64 - t);
    let y0 = y - (j as f64 - t);
    let z0 = z - (k as f64 - t);

    // Pick the tetrahedron by ordering x0, y0, z0
    let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
        if y0 >= z0 {
            (1, 0, 0, 1, 1, 0) // XYZ
        } else if x0 >= z0 {
            (1, 0, 0, 1, 0, 1) // XZY
        } else {
            (0, 0, 1, 1, 0, 1) // ZXY
        }
    } else if y0 < z0 {
        (0, 0, 1, 0, 1, 1) // ZYX
    } else if x0 < z0 {
        (0, 1, 0, 0, 1, 1) // YZX
    } else {
        (0, 1, 0, 1, 1, 0) // YXZ
    };

    let ip = i.wrapping_mul(PRIME_X);
    let jp = j.wrapping_mul(PRIME_Y);
    let kp = k.wrapping_mul(PRIME_Z);

    Cell3 {
        offsets: [
            [x0, y0, z0],
            [
                x0 - i1 as f64 + G3,
                y0 - j1 as f64 + G3,
                z0 - k1 as f64 + G3,
            ],
            [
                x0 - i2 as f64 + 2.0 * G3,
                y0 - j2 as f64 + 2.0 * G3,
                z0 - k2 as f64 + 2.0 * G3,
            ],
            [x0 - 1.0 + 3.0 * G3, y0 - 1.0 + 3.0 * G3, z0 - 1.0 + 3.0 * G3],
        ],
        grads: [
            grad3(seed, ip, jp, kp),
            grad3(
                seed,
                ip.wrapping_add(i1 * PRIME_X),
                jp.wrapping_add(j1 * PRIME_Y),
                kp.wrapping_add(k1 * PRIME_Z),
            ),
            grad3(
                seed,
                ip.wrapping_add(i2 * PRIME_X),
                jp.wrapping_add(j2 * PRIME_Y),
                kp.wrapping_add(k2 * PRIME_Z),
            ),
            grad3(
                seed,
                ip.wrapping_add(PRIME_X),
                jp.wrapping_add(PRIME_Y),
                kp.wrapping_add(PRIME_Z),
            ),
        ],
    }
}

/// 3D simplex noise in approximately `[-1, 1]`.
pub fn simplex_3d(seed: i64, x: f64, y: f64, z: f64) -> f64 {
    let cell = cell_3d(seed, x, y, z);
    let mut n = 0.0;
    for (o, g) in cell.offsets.iter().zip(&cell.grads) {
        // Kernel radius is 0.6 in 3D
        let t = 0.6 - o[0] * o[0] - o[1] * o[1] - o[2] * o[2];
        if t >= 0.0 {
            let t2 = t * t;
            n += t2 * t2 * (g[0] * o[0] + g[1] * o[1] + g[2] * o[2]);
        }
    }
    32.0 * n
}

/// 3D simplex noise with its analytic gradient: `[value, ∂x, ∂y, ∂z]`.
pub fn simplex_3d_with_gradient(seed: i64, x: f64, y: f64, z: f64) -> [f64; 4] {
    let cell = cell_3d(seed, x, y, z);
    let mut out = [0.0; 4];
    for (o, g) in cell.offsets.iter().zip(&cell.grads) {
        let t = 0.6 - o[0] * o[0] - o[1] * o[1] - o[2] * o[2];
        if t >= 0.0 {
            let dot = g[0] * o[0] + g[1] * o[1] + g[2] * o[2];
            let t2 = t * t;
            let t4 = t2 * t2;
            out[0] += t4 * dot;
            for ((d, gi), oi) in out[1..].iter_mut().zip(g).zip(o) {
                *d += t4 * gi + 4.0 * t2 * t * (-2.0 * oi) * dot;
            }
        }
    }
    out.map(|v| 32.0 * v)
}

// ── Simplex sampler ─────────────────────────────────────────────────

/// Gradient noise leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Simplex {
    frequency: f64,
}

impl Simplex {
    /// # Errors
    ///
    /// Returns [`SamplerError::InvalidFrequency`](crate::error::SamplerError::InvalidFrequency)
    /// unless `frequency` is finite and positive.
    pub fn new(frequency: f64) -> SamplerResult<Self> {
        Ok(Simplex {
            frequency: check_frequency(frequency)?,
        })
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f64) -> SamplerResult<()> {
        self.frequency = check_frequency(frequency)?;
        Ok(())
    }

    #[inline]
    pub fn sample_2d(&self, seed: i64, x: f64, y: f64) -> f64 {
        simplex_2d(seed, x * self.frequency, y * self.frequency)
    }

    #[inline]
    pub fn sample_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> f64 {
        let f = self.frequency;
        simplex_3d(seed, x * f, y * f, z * f)
    }

    #[inline]
    pub(crate) fn derivative_2d(&self, seed: i64, x: f64, y: f64) -> [f64; 3] {
        simplex_2d_with_gradient(seed, x * self.frequency, y * self.frequency)
    }

    #[inline]
    pub(crate) fn derivative_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> [f64; 4] {
        let f = self.frequency;
        simplex_3d_with_gradient(seed, x * f, y * f, z * f)
    }
}

// ── Sine sampler ────────────────────────────────────────────────────

/// Periodic egg-crate pattern: `sin(x)·cos(y)` in 2D and
/// `sin(x)·cos(y)·sin(z)` in 3D. Independent of the seed.
#[derive(Debug, Clone, PartialEq)]
pub struct Sine {
    frequency: f64,
}

impl Sine {
    pub fn new(frequency: f64) -> SamplerResult<Self> {
        Ok(Sine {
            frequency: check_frequency(frequency)?,
        })
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f64) -> SamplerResult<()> {
        self.frequency = check_frequency(frequency)?;
        Ok(())
    }

    #[inline]
    pub fn sample_2d(&self, x: f64, y: f64) -> f64 {
        let table = trig::table();
        table.sin(x * self.frequency) * table.cos(y * self.frequency)
    }

    #[inline]
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let table = trig::table();
        let f = self.frequency;
        table.sin(x * f) * table.cos(y * f) * table.sin(z * f)
    }

    #[inline]
    pub(crate) fn derivative_2d(&self, x: f64, y: f64) -> [f64; 3] {
        let table = trig::table();
        let (x, y) = (x * self.frequency, y * self.frequency);
        let (sx, cx) = (table.sin(x), table.cos(x));
        let (sy, cy) = (table.sin(y), table.cos(y));
        [sx * cy, cx * cy, -sx * sy]
    }

    #[inline]
    pub(crate) fn derivative_3d(&self, x: f64, y: f64, z: f64) -> [f64; 4] {
        let table = trig::table();
        let f = self.frequency;
        let (x, y, z) = (x * f, y * f, z * f);
        let (sx, cx) = (table.sin(x), table.cos(x));
        let (sy, cy) = (table.sin(y), table.cos(y));
        let (sz, cz) = (table.sin(z), table.cos(z));
        [sx * cy * sz, cx * cy * sz, -sx * sy * sz, sx * cy * cz]
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplex_2d_deterministic() {
        let a = simplex_2d(42, 1.5, 2.5);
        let b = simplex_2d(42, 1.5, 2.5);
        assert_eq!(a, b);
    }

    #[test]
    fn simplex_seed_changes_output() {
        let differs = (0..32).any(|i| {
            let x = i as f64 * 0.61 + 0.3;
            simplex_2d(1, x, x * 0.7) != simplex_2d(2, x, x * 0.7)
        });
        assert!(differs);
    }

    #[test]
    fn simplex_2d_range() {
        for seed in [0, 1, -7, i64::MAX, i64::MIN] {
            for i in 0..200 {
                let x = (i as f64) * 0.73 - 30.0;
                let y = (i as f64) * 1.17 - 50.0;
                let v = simplex_2d(seed, x, y);
                assert!(
                    (-1.5..=1.5).contains(&v),
                    "simplex_2d({seed}, {x}, {y}) = {v} out of expected range"
                );
            }
        }
    }

    #[test]
    fn simplex_3d_range() {
        for seed in [0, 3, -99] {
            for i in 0..200 {
                let x = (i as f64) * 0.73 - 30.0;
                let y = (i as f64) * 0.41 + 10.0;
                let z = (i as f64) * 1.17 - 50.0;
                let v = simplex_3d(seed, x, y, z);
                assert!(
                    (-1.5..=1.5).contains(&v),
                    "simplex_3d({seed}, {x}, {y}, {z}) = {v} out of expected range"
                );
            }
        }
    }

    #[test]
    fn gradient_2d_value_matches_plain() {
        for i in 0..50 {
            let x = (i as f64) * 0.73 - 10.0;
            let y = (i as f64) * 1.17 - 20.0;
            let plain = simplex_2d(42, x, y);
            let grad = simplex_2d_with_gradient(42, x, y);
            assert!(
                (plain - grad[0]).abs() < 1e-12,
                "Mismatch at ({x}, {y}): plain={plain}, grad.value={}",
                grad[0]
            );
        }
    }

    #[test]
    fn gradient_3d_value_matches_plain() {
        for i in 0..50 {
            let x = (i as f64) * 0.73 - 10.0;
            let y = (i as f64) * 0.41 + 10.0;
            let z = (i as f64) * 1.17 - 20.0;
            let plain = simplex_3d(42, x, y, z);
            let grad = simplex_3d_with_gradient(42, x, y, z);
            assert!((plain - grad[0]).abs() < 1e-12);
        }
    }

    #[test]
    fn gradient_2d_matches_finite_differences() {
        let h = 1e-6;
        for i in 0..40 {
            let x = (i as f64) * 0.377 - 4.0;
            let y = (i as f64) * 0.211 + 1.0;
            let [_, dx, dy] = simplex_2d_with_gradient(5, x, y);
            let fx = (simplex_2d(5, x + h, y) - simplex_2d(5, x - h, y)) / (2.0 * h);
            let fy = (simplex_2d(5, x, y + h) - simplex_2d(5, x, y - h)) / (2.0 * h);
            assert!((dx - fx).abs() < 1e-4, "dx {dx} vs {fx} at ({x}, {y})");
            assert!((dy - fy).abs() < 1e-4, "dy {dy} vs {fy} at ({x}, {y})");
        }
    }

    #[test]
    fn gradient_3d_matches_finite_differences() {
        let h = 1e-6;
        for i in 0..40 {
            let p = [(i as f64) * 0.377 - 4.0, (i as f64) * 0.19 + 2.0, (i as f64) * -0.211];
            let d = simplex_3d_with_gradient(9, p[0], p[1], p[2]);
            for axis in 0..3 {
                let mut hi = p;
                let mut lo = p;
                hi[axis] += h;
                lo[axis] -= h;
                let fd = (simplex_3d(9, hi[0], hi[1], hi[2]) - simplex_3d(9, lo[0], lo[1], lo[2]))
                    / (2.0 * h);
                assert!((d[axis + 1] - fd).abs() < 1e-4, "axis {axis}: {} vs {fd}", d[axis + 1]);
            }
        }
    }

    #[test]
    fn simplex_sampler_scales_by_frequency() {
        let s = Simplex::new(0.25).unwrap();
        assert_eq!(s.sample_2d(3, 8.0, 4.0), simplex_2d(3, 2.0, 1.0));
        assert_eq!(s.sample_3d(3, 8.0, 4.0, 12.0), simplex_3d(3, 2.0, 1.0, 3.0));
    }

    #[test]
    fn set_frequency_rejects_non_positive() {
        let mut s = Simplex::new(1.0).unwrap();
        assert!(s.set_frequency(0.0).is_err());
        assert_eq!(s.frequency(), 1.0);
        s.set_frequency(2.0).unwrap();
        assert_eq!(s.frequency(), 2.0);
        assert!(Sine::new(-1.0).is_err());
    }

    #[test]
    fn sine_tracks_reference_trig() {
        let s = Sine::new(1.0).unwrap();
        for i in 0..100 {
            let x = (i as f64) * 0.13 - 6.0;
            let y = (i as f64) * 0.29 - 9.0;
            let expected = x.sin() * y.cos();
            assert!((s.sample_2d(x, y) - expected).abs() < 0.002);
        }
    }

    #[test]
    fn sine_derivative_value_matches_sample() {
        let s = Sine::new(0.7).unwrap();
        for i in 0..50 {
            let (x, y, z) = (i as f64 * 0.4, i as f64 * -0.3, i as f64 * 0.9);
            assert_eq!(s.derivative_2d(x, y)[0], s.sample_2d(x, y));
            assert_eq!(s.derivative_3d(x, y, z)[0], s.sample_3d(x, y, z));
        }
    }

    #[test]
    fn sine_exact_on_axis_angles() {
        let s = Sine::new(1.0).unwrap();
        let quarter = std::f64::consts::FRAC_PI_2;
        assert_eq!(s.sample_2d(quarter, 0.0), 1.0);
        assert_eq!(s.sample_2d(-quarter, 0.0), -1.0);
        assert_eq!(s.derivative_2d(0.0, 0.0), [0.0, 1.0, 0.0]);
    }
}
