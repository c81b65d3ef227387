// sampler/mod.rs — the evaluation tree
//
// A sampler tree is a single enum, dispatched with one `match` per query.
// Composite nodes own their children through `Box`, so a tree is always a
// tree: no sharing, no cycles, and dropping the root drops everything.
//
// Derivative sampling is a capability of the *whole tree*. It is checked once
// by `Sampler::into_differentiable`, which hands back a `Differentiable`
// wrapper; the derivative paths below never re-check it per query.

pub mod arithmetic;
#[cfg(feature = "config")]
pub mod config;
pub mod fractal;
pub mod kernel;
pub mod noise;
pub mod normalizer;

use crate::error::{SamplerError, SamplerResult};
use arithmetic::{ArithmeticOp, BinaryArithmetic};
use fractal::Fractal;
use kernel::Kernel;
use noise::{Simplex, Sine};
use normalizer::Normalizer;

/// A node in a sampler tree.
///
/// Every variant answers `sample_2d`/`sample_3d` as a pure function of
/// `(seed, coordinates)`: identical inputs on an unmodified tree give
/// bit-identical output. Trees are `Send + Sync` and may be queried from any
/// number of threads at once.
#[derive(Debug, Clone)]
pub enum Sampler {
    /// The same value everywhere; all partial derivatives are zero.
    Constant(f64),
    Simplex(Simplex),
    Sine(Sine),
    Arithmetic(BinaryArithmetic),
    Fractal(Fractal),
    Kernel(Kernel),
    Normalizer(Normalizer),
}

impl Sampler {
    pub fn constant(value: f64) -> Self {
        Sampler::Constant(value)
    }

    pub fn add(left: Sampler, right: Sampler) -> Self {
        BinaryArithmetic::new(ArithmeticOp::Add, left, right).into()
    }

    pub fn sub(left: Sampler, right: Sampler) -> Self {
        BinaryArithmetic::new(ArithmeticOp::Sub, left, right).into()
    }

    pub fn mul(left: Sampler, right: Sampler) -> Self {
        BinaryArithmetic::new(ArithmeticOp::Mul, left, right).into()
    }

    pub fn div(left: Sampler, right: Sampler) -> Self {
        BinaryArithmetic::new(ArithmeticOp::Div, left, right).into()
    }

    pub fn min(left: Sampler, right: Sampler) -> Self {
        BinaryArithmetic::new(ArithmeticOp::Min, left, right).into()
    }

    pub fn max(left: Sampler, right: Sampler) -> Self {
        BinaryArithmetic::new(ArithmeticOp::Max, left, right).into()
    }

    // ── Scalar queries ──────────────────────────────────────────────

    #[inline]
    pub fn sample_2d(&self, seed: i64, x: f64, y: f64) -> f64 {
        match self {
            Sampler::Constant(v) => *v,
            Sampler::Simplex(s) => s.sample_2d(seed, x, y),
            Sampler::Sine(s) => s.sample_2d(x, y),
            Sampler::Arithmetic(a) => a.sample_2d(seed, x, y),
            Sampler::Fractal(f) => f.sample_2d(seed, x, y),
            Sampler::Kernel(k) => k.sample_2d(seed, x, y),
            Sampler::Normalizer(n) => n.sample_2d(seed, x, y),
        }
    }

    #[inline]
    pub fn sample_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> f64 {
        match self {
            Sampler::Constant(v) => *v,
            Sampler::Simplex(s) => s.sample_3d(seed, x, y, z),
            Sampler::Sine(s) => s.sample_3d(x, y, z),
            Sampler::Arithmetic(a) => a.sample_3d(seed, x, y, z),
            Sampler::Fractal(f) => f.sample_3d(seed, x, y, z),
            Sampler::Kernel(k) => k.sample_3d(seed, x, y, z),
            Sampler::Normalizer(n) => n.sample_3d(seed, x, y, z),
        }
    }

    // ── Capability ──────────────────────────────────────────────────

    /// Whether every node in this tree can produce partial derivatives.
    pub fn is_differentiable(&self) -> bool {
        self.first_non_differentiable().is_none()
    }

    /// Name of the first node (depth-first) that blocks derivative sampling.
    fn first_non_differentiable(&self) -> Option<&'static str> {
        match self {
            Sampler::Constant(_) | Sampler::Simplex(_) | Sampler::Sine(_) => None,
            Sampler::Arithmetic(a) => {
                if !a.op().is_differentiable() {
                    return Some(a.op().name());
                }
                a.left()
                    .first_non_differentiable()
                    .or_else(|| a.right().first_non_differentiable())
            }
            Sampler::Fractal(f) => f.input().first_non_differentiable(),
            Sampler::Kernel(k) => k.input().first_non_differentiable(),
            Sampler::Normalizer(n) => n.sampler().first_non_differentiable(),
        }
    }

    /// Verify the derivative capability once and unlock derivative queries.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::NotDifferentiable`] naming the offending node
    /// if any node in the tree lacks a derivative rule (Min, Max).
    pub fn into_differentiable(self) -> SamplerResult<Differentiable> {
        match self.first_non_differentiable() {
            Some(name) => Err(SamplerError::NotDifferentiable(name)),
            None => Ok(Differentiable { root: self }),
        }
    }

    // ── Derivative paths (reachable only through `Differentiable`) ──

    #[inline]
    pub(crate) fn derivative_2d(&self, seed: i64, x: f64, y: f64) -> [f64; 3] {
        match self {
            Sampler::Constant(v) => [*v, 0.0, 0.0],
            Sampler::Simplex(s) => s.derivative_2d(seed, x, y),
            Sampler::Sine(s) => s.derivative_2d(x, y),
            Sampler::Arithmetic(a) => a.derivative_2d(seed, x, y),
            Sampler::Fractal(f) => f.derivative_2d(seed, x, y),
            Sampler::Kernel(k) => k.derivative_2d(seed, x, y),
            Sampler::Normalizer(n) => n.derivative_2d(seed, x, y),
        }
    }

    #[inline]
    pub(crate) fn derivative_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> [f64; 4] {
        match self {
            Sampler::Constant(v) => [*v, 0.0, 0.0, 0.0],
            Sampler::Simplex(s) => s.derivative_3d(seed, x, y, z),
            Sampler::Sine(s) => s.derivative_3d(x, y, z),
            Sampler::Arithmetic(a) => a.derivative_3d(seed, x, y, z),
            Sampler::Fractal(f) => f.derivative_3d(seed, x, y, z),
            Sampler::Kernel(k) => k.derivative_3d(seed, x, y, z),
            Sampler::Normalizer(n) => n.derivative_3d(seed, x, y, z),
        }
    }
}

impl From<BinaryArithmetic> for Sampler {
    fn from(value: BinaryArithmetic) -> Self {
        Sampler::Arithmetic(value)
    }
}

impl From<Fractal> for Sampler {
    fn from(value: Fractal) -> Self {
        Sampler::Fractal(value)
    }
}

impl From<Kernel> for Sampler {
    fn from(value: Kernel) -> Self {
        Sampler::Kernel(value)
    }
}

impl From<Normalizer> for Sampler {
    fn from(value: Normalizer) -> Self {
        Sampler::Normalizer(value)
    }
}

impl From<Simplex> for Sampler {
    fn from(value: Simplex) -> Self {
        Sampler::Simplex(value)
    }
}

impl From<Sine> for Sampler {
    fn from(value: Sine) -> Self {
        Sampler::Sine(value)
    }
}

// ── Differentiable ──────────────────────────────────────────────────

/// A sampler tree whose every node has a derivative rule.
///
/// Derivative queries return the value first, then the partial derivatives:
/// `[v, ∂x, ∂y]` in 2D and `[v, ∂x, ∂y, ∂z]` in 3D.
#[derive(Debug, Clone)]
pub struct Differentiable {
    root: Sampler,
}

impl Differentiable {
    #[inline]
    pub fn sample_2d(&self, seed: i64, x: f64, y: f64) -> f64 {
        self.root.sample_2d(seed, x, y)
    }

    #[inline]
    pub fn sample_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> f64 {
        self.root.sample_3d(seed, x, y, z)
    }

    #[inline]
    pub fn sample_derivative_2d(&self, seed: i64, x: f64, y: f64) -> [f64; 3] {
        self.root.derivative_2d(seed, x, y)
    }

    #[inline]
    pub fn sample_derivative_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> [f64; 4] {
        self.root.derivative_3d(seed, x, y, z)
    }

    pub fn sampler(&self) -> &Sampler {
        &self.root
    }

    pub fn into_inner(self) -> Sampler {
        self.root
    }
}

impl TryFrom<Sampler> for Differentiable {
    type Error = SamplerError;

    fn try_from(value: Sampler) -> Result<Self, Self::Error> {
        value.into_differentiable()
    }
}

/// Shared frequency validation for every node that scales its input.
pub(crate) fn check_frequency(frequency: f64) -> SamplerResult<f64> {
    if frequency.is_finite() && frequency > 0.0 {
        Ok(frequency)
    } else {
        Err(SamplerError::InvalidFrequency(frequency))
    }
}
