//! Synthetic POD datasets for tests and local development.
//!
//! Writes `.npy` arrays in the on-disk layout the slice store reads:
//!
//! ```text
//! {root}/{area}/{height}m/{x,y,z,Psi,Xmean,A,wdNorm}.npy
//! ```
//!
//! Two analytic fields are provided:
//!
//! | Constructor | Field |
//! |-------------|-------|
//! | [`SyntheticSlice::uniform`] | `(u, v, w) = (u0, v0, 0) * ws_ref`, independent of direction |
//! | [`SyntheticSlice::rotating`] | `(u, v) = (cos wd, sin wd) * ws_ref`, sampled every 45 degrees |

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use npyz::WriterBuilder;

/// Arrays of one synthetic height slice, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSlice {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    /// 3N x `modes` basis.
    pub psi: Vec<f32>,
    pub modes: usize,
    pub mean: Vec<f32>,
    pub mean_shape: Vec<u64>,
    /// `modes` x M coefficients.
    pub coefficients: Vec<f32>,
    pub directions: Vec<f32>,
}

impl SyntheticSlice {
    /// A direction-independent field of constant `(u0, v0, 0)`.
    ///
    /// The mean carries the whole field; the single mode is zero.
    pub fn uniform(x: Vec<f32>, y: Vec<f32>, u0: f32, v0: f32) -> Self {
        let n = x.len();
        let mut mean = vec![u0; n];
        mean.extend(std::iter::repeat(v0).take(n));
        mean.extend(std::iter::repeat(0.0).take(n));

        Self {
            z: vec![0.0; n],
            psi: vec![0.0; 3 * n],
            modes: 1,
            mean,
            mean_shape: vec![3 * n as u64],
            coefficients: vec![0.0],
            directions: vec![0.0],
            x,
            y,
        }
    }

    /// A field of `(cos wd, sin wd, 0)` at every point, with a zero mean.
    ///
    /// Mode 0 drives u and mode 1 drives v; coefficients are sampled at
    /// eight directions, so values between samples are linear blends.
    pub fn rotating(x: Vec<f32>, y: Vec<f32>) -> Self {
        let n = x.len();
        let mut psi = vec![0.0; 3 * n * 2];
        for i in 0..n {
            psi[i * 2] = 1.0; // u block, mode 0
            psi[(n + i) * 2 + 1] = 1.0; // v block, mode 1
        }

        let directions: Vec<f32> = (0..8).map(|j| j as f32 * 45.0).collect();
        let mut coefficients = Vec::with_capacity(16);
        coefficients.extend(directions.iter().map(|d| d.to_radians().cos()));
        coefficients.extend(directions.iter().map(|d| d.to_radians().sin()));

        Self {
            z: vec![0.0; n],
            psi,
            modes: 2,
            mean: vec![0.0; n * 4],
            mean_shape: vec![n as u64, 4],
            coefficients,
            directions,
            x,
            y,
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Write every array into `dir`, with `_{height}` suffixes when
    /// `qualified_height` is set.
    pub fn write(&self, dir: &Path, qualified_height: Option<u32>) -> io::Result<()> {
        std::fs::create_dir_all(dir)?;
        let name = |base: &str| match qualified_height {
            Some(h) => dir.join(format!("{}_{}.npy", base, h)),
            None => dir.join(format!("{}.npy", base)),
        };

        let n = self.len() as u64;
        let k = self.modes as u64;
        let m = self.directions.len() as u64;

        write_npy(&name("x"), &[n], &self.x)?;
        write_npy(&name("y"), &[n], &self.y)?;
        write_npy(&name("z"), &[n], &self.z)?;
        write_npy(&name("Psi"), &[3 * n, k], &self.psi)?;
        write_npy(&name("Xmean"), &self.mean_shape, &self.mean)?;
        write_npy(&name("A"), &[k, m], &self.coefficients)?;
        write_npy(&name("wdNorm"), &[m], &self.directions)?;
        Ok(())
    }
}

/// Write a C-ordered `.npy` file.
pub fn write_npy<T>(path: &Path, shape: &[u64], data: &[T]) -> io::Result<()>
where
    T: npyz::AutoSerialize + Clone,
{
    let file = BufWriter::new(File::create(path)?);
    let mut writer = npyz::WriteOptions::<T>::new()
        .default_dtype()
        .shape(shape)
        .writer(file)
        .begin_nd()?;
    writer.extend(data.iter().cloned())?;
    writer.finish()
}

/// Create `{root}/{area}/{height}m` holding `slice` under plain names.
pub fn create_dataset(
    root: &Path,
    area: &str,
    height: u32,
    slice: &SyntheticSlice,
) -> io::Result<PathBuf> {
    let dir = root.join(area).join(format!("{}m", height));
    slice.write(&dir, None)?;
    Ok(dir)
}

/// Points (0,0), (1,0), (0,1), (1,1) with a uniform (1, 1) field.
pub fn unit_square_slice() -> SyntheticSlice {
    SyntheticSlice::uniform(vec![0.0, 1.0, 0.0, 1.0], vec![0.0, 0.0, 1.0, 1.0], 1.0, 1.0)
}

/// A `side` x `side` lattice of unit spacing offset by `(x0, y0)`.
pub fn lattice(side: usize, x0: f32, y0: f32) -> (Vec<f32>, Vec<f32>) {
    let mut xs = Vec::with_capacity(side * side);
    let mut ys = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            xs.push(x0 + col as f32);
            ys.push(y0 + row as f32);
        }
    }
    (xs, ys)
}
