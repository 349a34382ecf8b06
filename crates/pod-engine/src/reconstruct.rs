//! POD reconstruction of point velocities.
//!
//! ```text
//! velocity = (Psi[idx ++ idx+N ++ idx+2N, :] · A(wd_ref) + Xmean[idx, 0..3]) * ws_ref
//! ```
//!
//! `A(wd_ref)` interpolates every coefficient row over the reference
//! directions with a 360 degree period.

use nalgebra::DVector;

use crate::error::{PodError, Result};
use crate::store::HeightSlice;

/// Direction period in degrees.
pub const DIRECTION_PERIOD: f64 = 360.0;

/// Reconstructed velocity components, one entry per requested point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointVelocities {
    pub u: Vec<f32>,
    pub v: Vec<f32>,
    pub w: Vec<f32>,
}

/// Periodic linear interpolation of `fp` sampled at `xp`, evaluated at `x`.
///
/// Samples and query are reduced modulo `period`, samples are sorted, and
/// the table is extended by one wrapped sample on each side, so values wrap
/// across the period boundary instead of clamping.
pub fn interpolate_periodic(x: f64, xp: &[f64], fp: &[f64], period: f64) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    if xp.is_empty() {
        return f64::NAN;
    }

    let x = x.rem_euclid(period);

    let mut samples: Vec<(f64, f64)> = xp
        .iter()
        .map(|&p| p.rem_euclid(period))
        .zip(fp.iter().copied())
        .collect();
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (first, last) = (samples[0], samples[samples.len() - 1]);
    let mut table = Vec::with_capacity(samples.len() + 2);
    table.push((last.0 - period, last.1));
    table.extend(samples);
    table.push((first.0 + period, first.1));

    // Last segment whose left edge is <= x
    let j = table
        .partition_point(|&(p, _)| p <= x)
        .saturating_sub(1)
        .min(table.len() - 2);
    let (x0, y0) = table[j];
    let (x1, y1) = table[j + 1];

    if x >= x1 {
        return y1;
    }
    let dx = x1 - x0;
    if dx <= 0.0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / dx
}

/// Interpolate every coefficient row of the slice at `wd_ref`.
pub fn interpolate_coefficients(slice: &HeightSlice, wd_ref: f64) -> DVector<f64> {
    let xp: Vec<f64> = slice
        .reference_directions()
        .iter()
        .map(|&d| d as f64)
        .collect();
    let a = slice.direction_coefficients();

    DVector::from_iterator(
        a.nrows(),
        a.row_iter().map(|row| {
            let fp: Vec<f64> = row.iter().map(|&v| v as f64).collect();
            interpolate_periodic(wd_ref, &xp, &fp, DIRECTION_PERIOD)
        }),
    )
}

/// Reconstruct (u, v, w) at the given point indices.
///
/// Linear in `ws_ref` and periodic in `wd_ref`. Every index must be below
/// the slice's point count.
pub fn reconstruct(
    slice: &HeightSlice,
    indices: &[usize],
    ws_ref: f64,
    wd_ref: f64,
) -> Result<PointVelocities> {
    let n = slice.len();
    if let Some(&index) = indices.iter().find(|&&i| i >= n) {
        return Err(PodError::IndexOutOfBounds { index, len: n });
    }
    if indices.is_empty() {
        return Ok(PointVelocities::default());
    }

    let coefficients = interpolate_coefficients(slice, wd_ref);

    // Rows of the u, v and w blocks for the selected points
    let stacked: Vec<usize> = (0..3)
        .flat_map(|c| indices.iter().map(move |&i| c * n + i))
        .collect();

    let psi_subset = slice.basis_modes().select_rows(stacked.iter()).cast::<f64>();
    let mean = slice.mean_field();
    let mean_subset = DVector::from_iterator(
        stacked.len(),
        stacked.iter().map(|&r| mean[(r % n, r / n)] as f64),
    );

    let velocity = (psi_subset * coefficients + mean_subset) * ws_ref;

    let m = indices.len();
    let block = |c: usize| -> Vec<f32> {
        velocity.rows(c * m, m).iter().map(|&v| v as f32).collect()
    };

    Ok(PointVelocities {
        u: block(0),
        v: block(1),
        w: block(2),
    })
}
