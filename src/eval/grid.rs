// eval/grid.rs — 2D grid evaluation with rayon parallelism
//
// Samples a tree over an NxN grid of world-space positions. Each row is one Z
// coordinate and rows run in parallel with rayon::par_iter. Trees are
// immutable and `Sync`, so all threads share the same root.

use crate::sampler::{Differentiable, Sampler};
use rayon::prelude::*;
use serde::Serialize;

/// Result of sampling a tree over a 2D grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResult {
    /// Row-major f32 values, `values[z * n + x]`.
    /// Length = resolution × resolution.
    pub values: Vec<f32>,
    /// Grid resolution (NxN).
    pub resolution: u32,
    /// Minimum value in the result (for normalization).
    pub min_value: f32,
    /// Maximum value in the result (for normalization).
    pub max_value: f32,
}

/// Values plus partial derivatives over a 2D grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientGridResult {
    pub values: Vec<f32>,
    /// ∂/∂x per cell, same layout as `values`.
    pub dx: Vec<f32>,
    /// ∂/∂z per cell.
    pub dz: Vec<f32>,
    pub resolution: u32,
}

#[inline]
fn cell_center(range_min: f64, step: f64, idx: usize) -> f64 {
    range_min + (idx as f64 + 0.5) * step
}

/// Sample `sampler` over an NxN grid.
///
/// The grid covers world-space coordinates [range_min, range_max] in both X
/// and Z. Each sample is taken at the cell center (offset by half a step) and
/// queried as `sample_2d(seed, x, z)`.
pub fn evaluate_grid(
    sampler: &Sampler,
    seed: i64,
    resolution: u32,
    range_min: f64,
    range_max: f64,
) -> GridResult {
    let n = resolution as usize;
    let step = (range_max - range_min) / n as f64;

    let row_results: Vec<(Vec<f32>, f32, f32)> = (0..n)
        .into_par_iter()
        .map(|z_idx| {
            let z = cell_center(range_min, step, z_idx);

            let mut row = Vec::with_capacity(n);
            let mut row_min = f32::MAX;
            let mut row_max = f32::MIN;

            for x_idx in 0..n {
                let x = cell_center(range_min, step, x_idx);
                let val = sampler.sample_2d(seed, x, z) as f32;
                row_min = row_min.min(val);
                row_max = row_max.max(val);
                row.push(val);
            }

            (row, row_min, row_max)
        })
        .collect();

    // Flatten rows and compute global min/max
    let mut values = Vec::with_capacity(n * n);
    let mut min_val = f32::MAX;
    let mut max_val = f32::MIN;

    for (row, r_min, r_max) in row_results {
        min_val = min_val.min(r_min);
        max_val = max_val.max(r_max);
        values.extend(row);
    }

    log::debug!("grid {n}x{n} sampled, range [{min_val}, {max_val}]");

    GridResult {
        values,
        resolution,
        min_value: min_val,
        max_value: max_val,
    }
}

/// Sample values and partial derivatives over an NxN grid.
///
/// Same cell layout as [`evaluate_grid`].
pub fn evaluate_gradient_grid(
    sampler: &Differentiable,
    seed: i64,
    resolution: u32,
    range_min: f64,
    range_max: f64,
) -> GradientGridResult {
    let n = resolution as usize;
    let step = (range_max - range_min) / n as f64;

    let rows: Vec<Vec<[f64; 3]>> = (0..n)
        .into_par_iter()
        .map(|z_idx| {
            let z = cell_center(range_min, step, z_idx);
            (0..n)
                .map(|x_idx| {
                    let x = cell_center(range_min, step, x_idx);
                    sampler.sample_derivative_2d(seed, x, z)
                })
                .collect()
        })
        .collect();

    let mut values = Vec::with_capacity(n * n);
    let mut dx = Vec::with_capacity(n * n);
    let mut dz = Vec::with_capacity(n * n);
    for [v, gx, gz] in rows.into_iter().flatten() {
        values.push(v as f32);
        dx.push(gx as f32);
        dz.push(gz as f32);
    }

    GradientGridResult {
        values,
        dx,
        dz,
        resolution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::noise::Sine;

    #[test]
    fn constant_grid() {
        let sampler = Sampler::constant(42.0);

        let result = evaluate_grid(&sampler, 0, 4, -10.0, 10.0);

        assert_eq!(result.values.len(), 16);
        assert_eq!(result.resolution, 4);
        for &v in &result.values {
            assert!((v - 42.0).abs() < 1e-6);
        }
        assert!((result.min_value - 42.0).abs() < 1e-6);
        assert!((result.max_value - 42.0).abs() < 1e-6);
    }

    #[test]
    fn cell_centers_feed_x_then_z() {
        let sampler = Sampler::from(Sine::new(1.0).unwrap());

        // 2x2 grid over [-10, 10], step=10, centers at -5 and 5
        let result = evaluate_grid(&sampler, 0, 2, -10.0, 10.0);

        assert_eq!(result.values.len(), 4);
        let expected = [
            sampler.sample_2d(0, -5.0, -5.0),
            sampler.sample_2d(0, 5.0, -5.0),
            sampler.sample_2d(0, -5.0, 5.0),
            sampler.sample_2d(0, 5.0, 5.0),
        ];
        for (got, want) in result.values.iter().zip(expected) {
            assert_eq!(*got, want as f32);
        }
    }

    #[test]
    fn sum_grid() {
        let sampler = Sampler::add(Sampler::constant(10.0), Sampler::constant(20.0));

        let result = evaluate_grid(&sampler, 0, 8, -64.0, 64.0);

        assert_eq!(result.values.len(), 64);
        for &v in &result.values {
            assert!((v - 30.0).abs() < 1e-6);
        }
    }

    #[test]
    fn grid_resolution_1() {
        let result = evaluate_grid(&Sampler::constant(7.0), 0, 1, 0.0, 10.0);

        assert_eq!(result.values.len(), 1);
        assert!((result.values[0] - 7.0).abs() < 1e-6);
    }

    #[test]
    fn gradient_grid_matches_point_queries() {
        let sampler = Sampler::from(Sine::new(0.25).unwrap())
            .into_differentiable()
            .unwrap();

        let result = evaluate_gradient_grid(&sampler, 0, 3, 0.0, 6.0);

        assert_eq!(result.values.len(), 9);
        for z_idx in 0..3 {
            for x_idx in 0..3 {
                let (x, z) = (1.0 + 2.0 * x_idx as f64, 1.0 + 2.0 * z_idx as f64);
                let [v, gx, gz] = sampler.sample_derivative_2d(0, x, z);
                let i = z_idx * 3 + x_idx;
                assert_eq!(result.values[i], v as f32);
                assert_eq!(result.dx[i], gx as f32);
                assert_eq!(result.dz[i], gz as f32);
            }
        }
    }

    #[test]
    fn serializes_camel_case() {
        let result = evaluate_grid(&Sampler::constant(1.0), 0, 1, 0.0, 1.0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["minValue"], 1.0);
        assert_eq!(json["resolution"], 1);
    }
}
