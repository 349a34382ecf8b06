//! Immutable per-(area, height) POD decomposition data.

use nalgebra::DMatrix;
use rayon::prelude::*;
use wind_common::BoundingBox;

use super::npy::{reconcile_mean_field, MeanFieldCheck, MeanFieldLayout, NpyArray};
use crate::error::{PodError, Result};

/// Raw arrays of one slice as read from disk.
#[derive(Debug, Clone)]
pub struct SliceArrays {
    pub x: NpyArray,
    pub y: NpyArray,
    pub z: NpyArray,
    /// Basis modes, 3N x k.
    pub psi: NpyArray,
    /// Mean field in any supported layout.
    pub mean: NpyArray,
    /// Direction coefficients, k x M.
    pub coefficients: NpyArray,
    /// Reference directions in degrees, M values.
    pub directions: NpyArray,
}

/// Decomposition data for one area at one height.
///
/// Constructed only through [`HeightSlice::from_arrays`], which enforces the
/// size invariants; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct HeightSlice {
    x: Vec<f32>,
    y: Vec<f32>,
    z: Vec<f32>,
    psi: DMatrix<f32>,
    mean: DMatrix<f32>,
    mean_layout: MeanFieldLayout,
    coefficients: DMatrix<f32>,
    directions: Vec<f32>,
    extent: BoundingBox,
}

impl HeightSlice {
    /// Validate raw arrays and build a slice.
    ///
    /// Size violations in required arrays fail with `ShapeMismatch`. A
    /// malformed mean field is replaced with zeros and logged.
    pub fn from_arrays(arrays: SliceArrays) -> Result<Self> {
        let x = arrays.x.into_flat();
        let y = arrays.y.into_flat();
        let z = arrays.z.into_flat();
        let n = x.len();

        if n == 0 {
            return Err(PodError::shape_mismatch("slice has no points"));
        }
        if y.len() != n || z.len() != n {
            return Err(PodError::shape_mismatch(format!(
                "position arrays disagree: x={}, y={}, z={}",
                n,
                y.len(),
                z.len()
            )));
        }

        let psi = arrays.psi.into_matrix("Psi")?;
        if psi.nrows() != 3 * n {
            return Err(PodError::shape_mismatch(format!(
                "Psi has {} rows, expected 3 * {} = {}",
                psi.nrows(),
                n,
                3 * n
            )));
        }
        let k = psi.ncols();
        if k == 0 {
            return Err(PodError::shape_mismatch("Psi has no modes"));
        }

        let coefficients = arrays.coefficients.into_matrix("A")?;
        if coefficients.nrows() != k {
            return Err(PodError::shape_mismatch(format!(
                "A has {} rows, Psi has {} modes",
                coefficients.nrows(),
                k
            )));
        }

        let directions = arrays.directions.into_flat();
        if directions.is_empty() || directions.len() != coefficients.ncols() {
            return Err(PodError::shape_mismatch(format!(
                "wdNorm has {} directions, A has {} columns",
                directions.len(),
                coefficients.ncols()
            )));
        }

        let check = reconcile_mean_field(arrays.mean, n);
        if let MeanFieldCheck::Degraded { reason, .. } = &check {
            tracing::warn!(reason = %reason, "Mean field unusable, substituting zeros");
        }
        let (mean, mean_layout) = check.into_parts();

        let extent = extent_of(&x, &y);

        Ok(Self {
            x,
            y,
            z,
            psi,
            mean,
            mean_layout,
            coefficients,
            directions,
            extent,
        })
    }

    /// Number of points N.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false; a slice holds at least one point.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Number of POD modes k.
    pub fn mode_count(&self) -> usize {
        self.psi.ncols()
    }

    /// Number of reference directions M.
    pub fn direction_count(&self) -> usize {
        self.directions.len()
    }

    pub fn x(&self) -> &[f32] {
        &self.x
    }

    pub fn y(&self) -> &[f32] {
        &self.y
    }

    pub fn z(&self) -> &[f32] {
        &self.z
    }

    /// Basis modes, 3N x k.
    pub fn basis_modes(&self) -> &DMatrix<f32> {
        &self.psi
    }

    /// Mean field, N x 4.
    pub fn mean_field(&self) -> &DMatrix<f32> {
        &self.mean
    }

    /// How the stored mean field was interpreted.
    pub fn mean_field_layout(&self) -> MeanFieldLayout {
        self.mean_layout
    }

    /// Direction coefficients, k x M.
    pub fn direction_coefficients(&self) -> &DMatrix<f32> {
        &self.coefficients
    }

    /// Reference directions in degrees.
    pub fn reference_directions(&self) -> &[f32] {
        &self.directions
    }

    /// Min/max of x and y over all points.
    pub fn extent(&self) -> BoundingBox {
        self.extent
    }

    /// Indices of points inside `bbox` (edges inclusive), ascending.
    pub fn select_points(&self, bbox: &BoundingBox) -> Vec<usize> {
        (0..self.len())
            .into_par_iter()
            .filter(|&i| bbox.contains_point(self.x[i] as f64, self.y[i] as f64))
            .collect()
    }

    /// Approximate resident size in bytes.
    pub fn memory_bytes(&self) -> usize {
        let values = self.x.len() * 3
            + self.psi.len()
            + self.mean.len()
            + self.coefficients.len()
            + self.directions.len();
        values * std::mem::size_of::<f32>()
    }
}

fn extent_of(x: &[f32], y: &[f32]) -> BoundingBox {
    let (min_x, max_x) = min_max(x);
    let (min_y, max_y) = min_max(y);
    BoundingBox::new(min_x, min_y, max_x, max_y)
}

fn min_max(values: &[f32]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        let v = v as f64;
        (lo.min(v), hi.max(v))
    })
}
