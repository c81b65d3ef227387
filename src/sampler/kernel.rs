// sampler/kernel.rs — discrete convolution over a child sampler
//
// The weight matrix is resolved into a flat list of non-zero taps when the
// sampler is built. Queries walk the taps only; zero weights never reach the
// hot path. Taps are kept in row-major order so a dense matrix and the same
// matrix given as sparse taps accumulate in the same order and agree to the
// bit.
//
// Row index offsets x, column index offsets y (z in 3D, where the kernel lies
// in the XZ plane at fixed Y).

use super::{check_frequency, Sampler};
use crate::error::{SamplerError, SamplerResult};
use smallvec::SmallVec;

/// One non-zero kernel weight and its lattice offset.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tap {
    dx: f64,
    dy: f64,
    weight: f64,
}

#[derive(Debug, Clone)]
pub struct Kernel {
    input: Box<Sampler>,
    taps: SmallVec<[Tap; 9]>,
    rows: usize,
    cols: usize,
    frequency: f64,
}

impl Kernel {
    /// Build from a dense, rectangular weight matrix.
    ///
    /// # Errors
    ///
    /// [`SamplerError::EmptyKernel`] for an empty matrix or empty rows,
    /// [`SamplerError::RaggedKernel`] if rows differ in length,
    /// [`SamplerError::NonFiniteWeight`] for NaN or infinite weights.
    pub fn new<R: AsRef<[f64]>>(input: Sampler, kernel: &[R]) -> SamplerResult<Self> {
        let rows = kernel.len();
        let cols = kernel.first().map_or(0, |row| row.as_ref().len());
        if rows == 0 || cols == 0 {
            return Err(SamplerError::EmptyKernel);
        }

        let mut taps = SmallVec::new();
        for (kx, row) in kernel.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(SamplerError::RaggedKernel {
                    row: kx,
                    expected: cols,
                    got: row.len(),
                });
            }
            for (ky, &weight) in row.iter().enumerate() {
                if !weight.is_finite() {
                    return Err(SamplerError::NonFiniteWeight {
                        row: kx,
                        col: ky,
                        value: weight,
                    });
                }
                if weight != 0.0 {
                    taps.push(Tap {
                        dx: kx as f64,
                        dy: ky as f64,
                        weight,
                    });
                }
            }
        }

        Ok(Kernel {
            input: Box::new(input),
            taps,
            rows,
            cols,
            frequency: 1.0,
        })
    }

    /// Build from sparse `(row, col, weight)` taps inside a `rows × cols`
    /// footprint. Unlisted positions are zero.
    ///
    /// # Errors
    ///
    /// As [`Kernel::new`], plus [`SamplerError::TapOutOfBounds`] and
    /// [`SamplerError::DuplicateTap`].
    pub fn from_taps<I>(input: Sampler, rows: usize, cols: usize, taps: I) -> SamplerResult<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        if rows == 0 || cols == 0 {
            return Err(SamplerError::EmptyKernel);
        }

        let mut entries: Vec<(usize, usize, f64)> = taps.into_iter().collect();
        for &(row, col, value) in &entries {
            if row >= rows || col >= cols {
                return Err(SamplerError::TapOutOfBounds {
                    row,
                    col,
                    rows,
                    cols,
                });
            }
            if !value.is_finite() {
                return Err(SamplerError::NonFiniteWeight { row, col, value });
            }
        }
        entries.sort_by_key(|&(row, col, _)| (row, col));
        if let Some(w) = entries
            .windows(2)
            .find(|w| (w[0].0, w[0].1) == (w[1].0, w[1].1))
        {
            return Err(SamplerError::DuplicateTap {
                row: w[0].0,
                col: w[0].1,
            });
        }

        let taps = entries
            .into_iter()
            .filter(|&(_, _, weight)| weight != 0.0)
            .map(|(row, col, weight)| Tap {
                dx: row as f64,
                dy: col as f64,
                weight,
            })
            .collect();

        Ok(Kernel {
            input: Box::new(input),
            taps,
            rows,
            cols,
            frequency: 1.0,
        })
    }

    pub fn with_frequency(mut self, frequency: f64) -> SamplerResult<Self> {
        self.set_frequency(frequency)?;
        Ok(self)
    }

    pub fn set_frequency(&mut self, frequency: f64) -> SamplerResult<()> {
        self.frequency = check_frequency(frequency)?;
        Ok(())
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn input(&self) -> &Sampler {
        &self.input
    }

    /// `(rows, cols)` of the kernel footprint.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of non-zero weights.
    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }

    pub fn sample_2d(&self, seed: i64, x: f64, y: f64) -> f64 {
        let (x, y) = (x * self.frequency, y * self.frequency);
        let mut acc = 0.0;
        for tap in &self.taps {
            acc += self.input.sample_2d(seed, x + tap.dx, y + tap.dy) * tap.weight;
        }
        acc
    }

    pub fn sample_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> f64 {
        let f = self.frequency;
        let (x, y, z) = (x * f, y * f, z * f);
        let mut acc = 0.0;
        for tap in &self.taps {
            acc += self.input.sample_3d(seed, x + tap.dx, y, z + tap.dy) * tap.weight;
        }
        acc
    }

    // Convolution is linear, so each partial is the same weighted sum.

    pub(crate) fn derivative_2d(&self, seed: i64, x: f64, y: f64) -> [f64; 3] {
        let (x, y) = (x * self.frequency, y * self.frequency);
        let mut acc = [0.0; 3];
        for tap in &self.taps {
            let d = self.input.derivative_2d(seed, x + tap.dx, y + tap.dy);
            for (a, v) in acc.iter_mut().zip(d) {
                *a += v * tap.weight;
            }
        }
        acc
    }

    pub(crate) fn derivative_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> [f64; 4] {
        let f = self.frequency;
        let (x, y, z) = (x * f, y * f, z * f);
        let mut acc = [0.0; 4];
        for tap in &self.taps {
            let d = self.input.derivative_3d(seed, x + tap.dx, y, z + tap.dy);
            for (a, v) in acc.iter_mut().zip(d) {
                *a += v * tap.weight;
            }
        }
        acc
    }
}
