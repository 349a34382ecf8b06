//! Scatter-to-grid resampling with neighbor infill.

use wind_common::BoundingBox;

use crate::types::{ResampleDiagnostics, ResampleMode, WindFieldPoints};

/// Maximum infill passes.
pub const FILL_PASSES: usize = 4;

/// A resampled (u, v) grid, `ny` rows of `nx` cells, row 0 at minimum y.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledGrid {
    pub nx: usize,
    pub ny: usize,
    pub u: Vec<f32>,
    pub v: Vec<f32>,
    pub diagnostics: ResampleDiagnostics,
}

impl ResampledGrid {
    /// An all-NaN grid with no samples.
    pub fn empty(nx: usize, ny: usize, mode: ResampleMode) -> Self {
        let cells = nx * ny;
        Self {
            nx,
            ny,
            u: vec![f32::NAN; cells],
            v: vec![f32::NAN; cells],
            diagnostics: ResampleDiagnostics::empty(mode, cells),
        }
    }
}

/// Bin scattered samples into an `nx` x `ny` grid over `bbox`, average per
/// cell and fill empty cells from their neighbors.
///
/// A sample lands in cell `(floor((x - min_x) / width * nx),
/// floor((y - min_y) / height * ny))`; samples outside the grid, including
/// those exactly on the max edges, are discarded. A box without positive
/// finite extent yields an all-NaN grid in `invalid_bbox` mode.
pub fn resample(points: &WindFieldPoints, bbox: &BoundingBox, nx: usize, ny: usize) -> ResampledGrid {
    let width = bbox.width();
    let height = bbox.height();
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return ResampledGrid::empty(nx, ny, ResampleMode::InvalidBbox);
    }

    let cells = nx * ny;
    let mut sum_u = vec![0.0f64; cells];
    let mut sum_v = vec![0.0f64; cells];
    let mut count = vec![0u32; cells];
    let mut used = 0usize;

    let samples = points
        .x
        .iter()
        .zip(&points.y)
        .zip(points.u.iter().zip(&points.v));

    for ((&x, &y), (&u, &v)) in samples {
        let fx = ((x as f64 - bbox.min_x) / width * nx as f64).floor();
        let fy = ((y as f64 - bbox.min_y) / height * ny as f64).floor();
        // NaN comparisons are false, so non-finite positions are dropped too
        if !(fx >= 0.0 && fx < nx as f64 && fy >= 0.0 && fy < ny as f64) {
            continue;
        }
        let cell = fy as usize * nx + fx as usize;
        sum_u[cell] += u as f64;
        sum_v[cell] += v as f64;
        count[cell] += 1;
        used += 1;
    }

    let mut grid_u = vec![f32::NAN; cells];
    let mut grid_v = vec![f32::NAN; cells];
    let mut empty = 0usize;
    for cell in 0..cells {
        if count[cell] == 0 {
            empty += 1;
        } else {
            grid_u[cell] = (sum_u[cell] / count[cell] as f64) as f32;
            grid_v[cell] = (sum_v[cell] / count[cell] as f64) as f32;
        }
    }

    fill_gaps(&mut grid_u, &mut grid_v, nx, ny, FILL_PASSES);

    ResampledGrid {
        nx,
        ny,
        u: grid_u,
        v: grid_v,
        diagnostics: ResampleDiagnostics {
            mode: ResampleMode::BinAverageNnFill,
            points_used: used,
            empty_cells_initial: empty,
        },
    }
}

/// Toroidal 4-neighbor infill.
///
/// Each pass reads the grid as it was when the pass started. A cell with a
/// non-finite component takes (u, v) from the first neighbor, in the order
/// up, down, left, right, whose components are both finite.
pub fn fill_gaps(u: &mut [f32], v: &mut [f32], nx: usize, ny: usize, passes: usize) {
    for _ in 0..passes {
        let complete = u.iter().zip(v.iter()).all(|(a, b)| a.is_finite() && b.is_finite());
        if complete {
            break;
        }

        let prev_u = u.to_vec();
        let prev_v = v.to_vec();

        for row in 0..ny {
            for col in 0..nx {
                let i = row * nx + col;
                if finite(&prev_u, &prev_v, i) {
                    continue;
                }
                let neighbors = [
                    ((row + ny - 1) % ny) * nx + col,
                    ((row + 1) % ny) * nx + col,
                    row * nx + (col + nx - 1) % nx,
                    row * nx + (col + 1) % nx,
                ];
                if let Some(&j) = neighbors.iter().find(|&&j| finite(&prev_u, &prev_v, j)) {
                    u[i] = prev_u[j];
                    v[i] = prev_v[j];
                }
            }
        }
    }
}

fn finite(u: &[f32], v: &[f32], i: usize) -> bool {
    u[i].is_finite() && v[i].is_finite()
}

/// Cell-center coordinates of an `nx` x `ny` grid over `bbox`, row-major.
pub fn grid_cell_centers(bbox: &BoundingBox, nx: usize, ny: usize) -> Vec<(f64, f64)> {
    let width = bbox.width();
    let height = bbox.height();
    let mut centers = Vec::with_capacity(nx * ny);
    for row in 0..ny {
        let y = bbox.min_y + (row as f64 + 0.5) / ny as f64 * height;
        for col in 0..nx {
            let x = bbox.min_x + (col as f64 + 0.5) / nx as f64 * width;
            centers.push((x, y));
        }
    }
    centers
}

/// Min and max of `hypot(u, v)` over cells where the speed is finite.
/// Both are NaN when no cell qualifies.
pub fn speed_range(u: &[f32], v: &[f32]) -> (f32, f32) {
    u.iter()
        .zip(v)
        .map(|(&u, &v)| u.hypot(v))
        .filter(|s| s.is_finite())
        .fold(None, |acc: Option<(f32, f32)>, s| match acc {
            None => Some((s, s)),
            Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
        })
        .unwrap_or((f32::NAN, f32::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_all_nan, assert_approx_eq};

    fn points(samples: &[(f32, f32, f32, f32)]) -> WindFieldPoints {
        WindFieldPoints {
            x: samples.iter().map(|s| s.0).collect(),
            y: samples.iter().map(|s| s.1).collect(),
            u: samples.iter().map(|s| s.2).collect(),
            v: samples.iter().map(|s| s.3).collect(),
            w: vec![0.0; samples.len()],
        }
    }

    #[test]
    fn test_single_point_single_cell() {
        let p = points(&[(0.5, 0.5, 3.0, -4.0)]);
        let grid = resample(&p, &BoundingBox::new(0.0, 0.0, 1.0, 1.0), 1, 1);
        assert_eq!(grid.u, vec![3.0]);
        assert_eq!(grid.v, vec![-4.0]);
        assert_eq!(grid.diagnostics.points_used, 1);
        assert_eq!(grid.diagnostics.empty_cells_initial, 0);
        assert_eq!(grid.diagnostics.mode, ResampleMode::BinAverageNnFill);
    }

    #[test]
    fn test_cell_average() {
        let p = points(&[(0.1, 0.1, 1.0, 2.0), (0.2, 0.3, 3.0, 6.0), (0.9, 0.9, 10.0, 10.0)]);
        let grid = resample(&p, &BoundingBox::new(0.0, 0.0, 1.0, 1.0), 2, 2);
        assert_eq!(grid.u[0], 2.0);
        assert_eq!(grid.v[0], 4.0);
        assert_eq!(grid.u[3], 10.0);
        assert_eq!(grid.diagnostics.points_used, 3);
        assert_eq!(grid.diagnostics.empty_cells_initial, 2);
    }

    #[test]
    fn test_upper_edge_points_are_discarded() {
        let p = points(&[(1.0, 0.5, 1.0, 1.0), (0.5, 1.0, 1.0, 1.0), (-0.1, 0.5, 1.0, 1.0)]);
        let grid = resample(&p, &BoundingBox::new(0.0, 0.0, 1.0, 1.0), 2, 2);
        assert_eq!(grid.diagnostics.points_used, 0);
        assert_eq!(grid.diagnostics.empty_cells_initial, 4);
        assert_all_nan!(grid.u);
    }

    #[test]
    fn test_unit_square_corners() {
        let p = points(&[
            (0.0, 0.0, 1.0, 1.0),
            (1.0, 0.0, 1.0, 1.0),
            (0.0, 1.0, 1.0, 1.0),
            (1.0, 1.0, 1.0, 1.0),
        ]);
        let grid = resample(&p, &BoundingBox::new(0.0, 0.0, 1.0, 1.0), 2, 2);
        assert_eq!(grid.u, vec![1.0; 4]);
        assert_eq!(grid.v, vec![1.0; 4]);
        assert_eq!(grid.diagnostics.points_used, 1);
        assert_eq!(grid.diagnostics.empty_cells_initial, 3);
    }

    #[test]
    fn test_infill_neighbor_priority() {
        // 3x3 grid: sample below-center (row 0) and left-of-center (col 0)
        let p = points(&[(1.5, 0.5, 1.0, 0.0), (0.5, 1.5, 2.0, 0.0)]);
        let grid = resample(&p, &BoundingBox::new(0.0, 0.0, 3.0, 3.0), 3, 3);
        // Center cell: up (row 0) wins over left (col 0)
        assert_eq!(grid.u[4], 1.0);
    }

    #[test]
    fn test_infill_is_toroidal_and_bounded() {
        // 9x1 grid with a single sample in column 0
        let p = points(&[(0.5, 0.5, 5.0, 5.0)]);
        let grid = resample(&p, &BoundingBox::new(0.0, 0.0, 9.0, 1.0), 9, 1);
        // Four passes reach columns 1..=4 and, wrapping, 5..=8
        assert!(grid.u.iter().all(|u| *u == 5.0));

        // 11 columns leave column 5 and 6 beyond four steps either way
        let grid = resample(&p, &BoundingBox::new(0.0, 0.0, 11.0, 1.0), 11, 1);
        assert_eq!(grid.u[4], 5.0);
        assert_eq!(grid.u[7], 5.0);
        assert!(grid.u[5].is_nan());
        assert!(grid.u[6].is_nan());
    }

    #[test]
    fn test_no_samples_stay_nan() {
        let grid = resample(&WindFieldPoints::default(), &BoundingBox::new(0.0, 0.0, 1.0, 1.0), 3, 2);
        assert_eq!(grid.u.len(), 6);
        assert_all_nan!(grid.u);
        assert_all_nan!(grid.v);
        assert_eq!(grid.diagnostics.empty_cells_initial, 6);
    }

    #[test]
    fn test_invalid_bbox() {
        let p = points(&[(0.5, 0.5, 1.0, 1.0)]);
        let grid = resample(&p, &BoundingBox::new(1.0, 0.0, 1.0, 1.0), 4, 3);
        assert_eq!(grid.diagnostics.mode, ResampleMode::InvalidBbox);
        assert_eq!(grid.diagnostics.points_used, 0);
        assert_eq!(grid.diagnostics.empty_cells_initial, 12);
        assert_eq!(grid.u.len(), 12);
        assert_all_nan!(grid.u);
        assert_all_nan!(grid.v);

        let reversed = resample(&p, &BoundingBox::new(2.0, 0.0, 1.0, 1.0), 2, 2);
        assert_eq!(reversed.diagnostics.mode, ResampleMode::InvalidBbox);
    }

    #[test]
    fn test_order_independent() {
        let samples = vec![
            (0.1, 0.1, 1.0, 2.0),
            (0.15, 0.2, 3.5, -1.0),
            (0.8, 0.3, -2.0, 0.25),
            (0.6, 0.9, 0.75, 0.5),
            (0.55, 0.95, 1.25, 1.5),
        ];
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let forward = resample(&points(&samples), &bbox, 3, 3);

        let mut reversed = samples.clone();
        reversed.reverse();
        let backward = resample(&points(&reversed), &bbox, 3, 3);

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_cell_centers() {
        let centers = grid_cell_centers(&BoundingBox::new(0.0, 10.0, 4.0, 12.0), 2, 2);
        assert_eq!(centers, vec![(1.0, 10.5), (3.0, 10.5), (1.0, 11.5), (3.0, 11.5)]);
    }

    #[test]
    fn test_speed_range() {
        let (lo, hi) = speed_range(&[3.0, f32::NAN, 1.0], &[4.0, 1.0, 1.0]);
        assert_approx_eq!(lo, 2f32.sqrt(), 1e-6);
        assert_eq!(hi, 5.0);

        let (lo, hi) = speed_range(&[f32::NAN], &[f32::NAN]);
        assert!(lo.is_nan() && hi.is_nan());
    }
}
