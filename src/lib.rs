// lib.rs — deterministic noise sampler trees
//
// Build a tree from leaves (`Simplex`, `Sine`, constants) and composites
// (arithmetic, fractal, kernel, normalizer), then query it at any point with a
// seed. Queries are pure and lock-free; trees can be shared across threads.
//
// Optional layers:
//   config  (default)  serde `SamplerConfig` → validated `Sampler`
//   eval               rayon grid/volume sampling over a built tree

pub mod error;
#[cfg(feature = "eval")]
pub mod eval;
pub mod math;
pub mod sampler;

pub use error::{LutError, SamplerError, SamplerResult};
pub use sampler::arithmetic::{ArithmeticOp, BinaryArithmetic};
#[cfg(feature = "config")]
pub use sampler::config::SamplerConfig;
pub use sampler::fractal::{Fractal, FractalParams};
pub use sampler::kernel::Kernel;
pub use sampler::noise::{Simplex, Sine};
pub use sampler::normalizer::Normalizer;
pub use sampler::{Differentiable, Sampler};
