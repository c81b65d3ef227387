// error.rs — construction-time and table-validation failures
//
// Every query on a built tree is infallible. Anything that can go wrong is
// caught here, once, before the first sample is taken.

use thiserror::Error;

/// Contract violations detected while building a sampler tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
    #[error("kernel must contain at least one row and one column")]
    EmptyKernel,

    #[error("kernel row {row} has {got} columns, expected {expected}")]
    RaggedKernel {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("kernel weight at [{row}][{col}] is not finite: {value}")]
    NonFiniteWeight { row: usize, col: usize, value: f64 },

    #[error("kernel tap [{row}][{col}] lies outside a {rows}x{cols} kernel")]
    TapOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("kernel tap [{row}][{col}] is listed more than once")]
    DuplicateTap { row: usize, col: usize },

    #[error("normalizer bounds must be finite with min < max, got [{min}, {max}]")]
    InvalidBounds { min: f64, max: f64 },

    #[error("octaves must be >= 1, got {0}")]
    InvalidOctaves(u32),

    #[error("lacunarity must be finite and > 0, got {0}")]
    InvalidLacunarity(f64),

    #[error("gain must be finite and > 0, got {0}")]
    InvalidGain(f64),

    #[error("weighted strength must lie in [0, 1], got {0}")]
    InvalidWeightedStrength(f64),

    #[error("frequency must be finite and > 0, got {0}")]
    InvalidFrequency(f64),

    #[error("sampler tree contains a non-differentiable node: {0}")]
    NotDifferentiable(&'static str),
}

pub type SamplerResult<T> = Result<T, SamplerError>;

/// The sine table disagreed with the reference implementation.
///
/// Raised once during table construction. A process that sees this must not
/// serve noise queries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LutError {
    #[error("LUT error at angle {angle} (expected: {expected}, found: {found})")]
    Mismatch {
        angle: f64,
        expected: f64,
        found: f64,
    },

    #[error("LUT error at cardinal direction {degrees} (expected: {expected}, found: {found})")]
    Cardinal {
        degrees: u32,
        expected: f64,
        found: f64,
    },
}
