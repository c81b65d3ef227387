// eval/volume.rs — 3D volume evaluation with rayon parallelism
//
// Samples a tree over a 3D volume (NxN XZ grid × Y slices).
// Y-slices are evaluated in parallel using rayon::par_iter.

use crate::sampler::Sampler;
use rayon::prelude::*;
use serde::Serialize;

/// Result of sampling a tree over a 3D volume.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeResult {
    /// Y-major layout: densities[y * n * n + z * n + x].
    /// Length = resolution × resolution × y_slices.
    pub densities: Vec<f32>,
    /// XZ grid resolution (NxN per slice).
    pub resolution: u32,
    /// Number of Y slices.
    pub y_slices: u32,
    pub min_value: f32,
    pub max_value: f32,
}

/// Sample `sampler` over a 3D volume.
///
/// The volume covers world-space coordinates [range_min, range_max] in X and Z,
/// and [y_min, y_max] in Y, endpoints included. Each XZ sample is taken at the
/// cell center.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_volume(
    sampler: &Sampler,
    seed: i64,
    resolution: u32,
    range_min: f64,
    range_max: f64,
    y_min: f64,
    y_max: f64,
    y_slices: u32,
) -> VolumeResult {
    let n = resolution as usize;
    let ys = y_slices as usize;
    let step_xz = (range_max - range_min) / n as f64;
    let step_y = if ys > 1 {
        (y_max - y_min) / (ys as f64 - 1.0)
    } else {
        0.0
    };

    let slice_results: Vec<(Vec<f32>, f32, f32)> = (0..ys)
        .into_par_iter()
        .map(|yi| {
            let wy = y_min + yi as f64 * step_y;

            let mut slice = Vec::with_capacity(n * n);
            let mut min_v = f32::MAX;
            let mut max_v = f32::MIN;

            for zi in 0..n {
                let wz = range_min + (zi as f64 + 0.5) * step_xz;
                for xi in 0..n {
                    let wx = range_min + (xi as f64 + 0.5) * step_xz;
                    let val = sampler.sample_3d(seed, wx, wy, wz) as f32;
                    min_v = min_v.min(val);
                    max_v = max_v.max(val);
                    slice.push(val);
                }
            }

            (slice, min_v, max_v)
        })
        .collect();

    // Assemble slices into Y-major layout and compute global min/max
    let mut densities = Vec::with_capacity(n * n * ys);
    let mut min_val = f32::MAX;
    let mut max_val = f32::MIN;

    for (slice, s_min, s_max) in slice_results {
        min_val = min_val.min(s_min);
        max_val = max_val.max(s_max);
        densities.extend(slice);
    }

    log::debug!("volume {n}x{n}x{ys} sampled, range [{min_val}, {max_val}]");

    VolumeResult {
        densities,
        resolution,
        y_slices,
        min_value: min_val,
        max_value: max_val,
    }
}
