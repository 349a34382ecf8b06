//! Test data generators for synthetic wind datasets.
//!
//! These generators create predictable, verifiable point clouds and
//! direction tables that can be used across the test suite.

/// Creates a regular point cloud covering an extent.
///
/// Points sit at the centers of an `nx` x `ny` lattice over
/// `(min_x, min_y, max_x, max_y)`, row-major from the lower-left corner.
///
/// # Returns
///
/// `(x, y)` coordinate vectors of length `nx * ny`.
///
/// # Example
///
/// ```
/// use test_utils::create_point_cloud;
///
/// let (x, y) = create_point_cloud((0.0, 0.0, 4.0, 2.0), 4, 2);
/// assert_eq!(x.len(), 8);
/// assert_eq!((x[0], y[0]), (0.5, 0.5));
/// assert_eq!((x[5], y[5]), (1.5, 1.5));
/// ```
pub fn create_point_cloud(
    extent: (f64, f64, f64, f64),
    nx: usize,
    ny: usize,
) -> (Vec<f64>, Vec<f64>) {
    let (min_x, min_y, max_x, max_y) = extent;
    let dx = (max_x - min_x) / nx.max(1) as f64;
    let dy = (max_y - min_y) / ny.max(1) as f64;

    let mut xs = Vec::with_capacity(nx * ny);
    let mut ys = Vec::with_capacity(nx * ny);
    for row in 0..ny {
        for col in 0..nx {
            xs.push(min_x + (col as f64 + 0.5) * dx);
            ys.push(min_y + (row as f64 + 0.5) * dy);
        }
    }
    (xs, ys)
}

/// Creates `m` reference directions evenly spaced over 360 degrees,
/// starting at 0.
///
/// ```
/// use test_utils::create_direction_table;
///
/// assert_eq!(create_direction_table(4), vec![0.0, 90.0, 180.0, 270.0]);
/// ```
pub fn create_direction_table(m: usize) -> Vec<f32> {
    let step = 360.0 / m.max(1) as f32;
    (0..m).map(|j| j as f32 * step).collect()
}

/// Creates a `k` x `m` coefficient table where row `i` follows
/// `cos(direction + 90 * i)`.
///
/// Smooth periodic rows make interpolation results easy to check.
///
/// # Returns
///
/// A `Vec<f32>` in row-major order (row 0 first).
pub fn create_coefficient_table(k: usize, directions: &[f32]) -> Vec<f32> {
    let mut data = Vec::with_capacity(k * directions.len());
    for i in 0..k {
        for &wd in directions {
            let phase = (wd as f64 + 90.0 * i as f64).to_radians();
            data.push(phase.cos() as f32);
        }
    }
    data
}
