//! `.npy` array loading and input file resolution.

use std::io;
use std::path::{Path, PathBuf};

use nalgebra::DMatrix;
use npyz::{NpyFile, Order};

use crate::error::{PodError, Result};

/// A dense array read from an `.npy` file, converted to `f32` and stored in
/// C (row-major) order.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl NpyArray {
    /// One-dimensional array.
    pub fn from_flat(data: Vec<f32>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Two-dimensional array from row-major data.
    pub fn from_rows(rows: usize, cols: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(rows * cols, data.len());
        Self {
            shape: vec![rows, cols],
            data,
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drop the shape, keeping the elements in C order.
    pub fn into_flat(self) -> Vec<f32> {
        self.data
    }

    /// Interpret a 2-D array as a matrix.
    pub fn into_matrix(self, name: &str) -> Result<DMatrix<f32>> {
        match self.shape.as_slice() {
            &[rows, cols] => Ok(DMatrix::from_row_slice(rows, cols, &self.data)),
            shape => Err(PodError::shape_mismatch(format!(
                "{} must be 2-D, got shape {:?}",
                name, shape
            ))),
        }
    }
}

/// Read an `.npy` file of any float or integer dtype.
pub fn read_npy(path: &Path) -> Result<NpyArray> {
    let bytes = std::fs::read(path).map_err(|e| PodError::read(path, e))?;
    decode_npy(&bytes).map_err(|e| PodError::read(path, e))
}

/// Decode in-memory `.npy` bytes.
pub fn decode_npy(bytes: &[u8]) -> io::Result<NpyArray> {
    let header = NpyFile::new(bytes)?;
    let shape: Vec<usize> = header.shape().iter().map(|&d| d as usize).collect();
    let order = header.order();

    let data = decode_elements(bytes)?;
    let expected: usize = shape.iter().product();
    if data.len() != expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("shape {:?} holds {} elements, found {}", shape, expected, data.len()),
        ));
    }

    let data = match (order, shape.as_slice()) {
        (Order::Fortran, &[rows, cols]) => fortran_to_c(&data, rows, cols),
        (Order::Fortran, s) if s.len() > 2 => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Fortran-ordered arrays of rank {} are not supported", s.len()),
            ))
        }
        _ => data,
    };

    Ok(NpyArray { shape, data })
}

/// Try each supported element type until one matches the header dtype.
fn decode_elements(bytes: &[u8]) -> io::Result<Vec<f32>> {
    if let Ok(v) = NpyFile::new(bytes)?.into_vec::<f32>() {
        return Ok(v);
    }
    if let Ok(v) = NpyFile::new(bytes)?.into_vec::<f64>() {
        return Ok(v.into_iter().map(|x| x as f32).collect());
    }
    if let Ok(v) = NpyFile::new(bytes)?.into_vec::<i64>() {
        return Ok(v.into_iter().map(|x| x as f32).collect());
    }
    if let Ok(v) = NpyFile::new(bytes)?.into_vec::<i32>() {
        return Ok(v.into_iter().map(|x| x as f32).collect());
    }
    if let Ok(v) = NpyFile::new(bytes)?.into_vec::<i16>() {
        return Ok(v.into_iter().map(f32::from).collect());
    }
    if let Ok(v) = NpyFile::new(bytes)?.into_vec::<u16>() {
        return Ok(v.into_iter().map(f32::from).collect());
    }
    if let Ok(v) = NpyFile::new(bytes)?.into_vec::<i8>() {
        return Ok(v.into_iter().map(f32::from).collect());
    }
    if let Ok(v) = NpyFile::new(bytes)?.into_vec::<u8>() {
        return Ok(v.into_iter().map(f32::from).collect());
    }
    if let Ok(v) = NpyFile::new(bytes)?.into_vec::<u32>() {
        return Ok(v.into_iter().map(|x| x as f32).collect());
    }
    let v = NpyFile::new(bytes)?.into_vec::<u64>()?;
    Ok(v.into_iter().map(|x| x as f32).collect())
}

fn fortran_to_c(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(data.len());
    for r in 0..rows {
        for c in 0..cols {
            out.push(data[c * rows + r]);
        }
    }
    out
}

/// Resolve `{name}_{height}.npy`, falling back to `{name}.npy`.
pub fn resolve_input(dir: &Path, name: &str, height: u32) -> Option<PathBuf> {
    let qualified = dir.join(format!("{}_{}.npy", name, height));
    if qualified.is_file() {
        return Some(qualified);
    }
    let plain = dir.join(format!("{}.npy", name));
    plain.is_file().then_some(plain)
}

/// Resolve and read one named input array of a slice directory.
pub fn load_input(dir: &Path, area: &str, name: &str, height: u32) -> Result<NpyArray> {
    let path =
        resolve_input(dir, name, height).ok_or_else(|| PodError::missing_input(name, area, height))?;
    tracing::debug!(path = %path.display(), "Reading input array");
    read_npy(&path)
}

/// How a stored mean field was mapped onto N x 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeanFieldLayout {
    /// N x 4 matrix used as-is.
    Matrix,
    /// Flat component blocks of N values each, zero-padded to 4.
    FlatStacked { components: usize },
    /// N x c matrix with c < 4, zero-padded.
    Padded { columns: usize },
    /// N x c matrix with c > 4, first 4 columns kept.
    Truncated { columns: usize },
    /// Unusable input replaced with zeros.
    Zeroed,
}

/// Outcome of mean field reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum MeanFieldCheck {
    Normalized {
        field: DMatrix<f32>,
        layout: MeanFieldLayout,
    },
    Degraded {
        field: DMatrix<f32>,
        reason: String,
    },
}

impl MeanFieldCheck {
    pub fn field(&self) -> &DMatrix<f32> {
        match self {
            Self::Normalized { field, .. } | Self::Degraded { field, .. } => field,
        }
    }

    pub fn layout(&self) -> MeanFieldLayout {
        match self {
            Self::Normalized { layout, .. } => *layout,
            Self::Degraded { .. } => MeanFieldLayout::Zeroed,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn into_parts(self) -> (DMatrix<f32>, MeanFieldLayout) {
        let layout = self.layout();
        match self {
            Self::Normalized { field, .. } | Self::Degraded { field, .. } => (field, layout),
        }
    }
}

/// Map a stored mean field onto an N x 4 matrix.
///
/// Flat input is read as consecutive component blocks (block c is column c),
/// the same stacking the basis modes use. Column vectors and row vectors are
/// treated as flat. Anything unrecognized becomes zeros.
pub fn reconcile_mean_field(array: NpyArray, n: usize) -> MeanFieldCheck {
    let flat_len = match array.shape.as_slice() {
        &[len] => Some(len),
        &[rows, cols] if rows != n && (rows == 1 || cols == 1) => Some(rows * cols),
        _ => None,
    };

    if let Some(len) = flat_len {
        if n > 0 && len % n == 0 && (2..=4).contains(&(len / n)) {
            let components = len / n;
            let field = DMatrix::from_fn(n, 4, |i, c| {
                if c < components {
                    array.data[c * n + i]
                } else {
                    0.0
                }
            });
            return MeanFieldCheck::Normalized {
                field,
                layout: MeanFieldLayout::FlatStacked { components },
            };
        }
        return MeanFieldCheck::Degraded {
            field: DMatrix::zeros(n, 4),
            reason: format!("flat mean field of length {} does not match {} points", len, n),
        };
    }

    match array.shape.as_slice() {
        &[rows, cols] if rows == n => {
            let layout = match cols {
                4 => MeanFieldLayout::Matrix,
                c if c < 4 => MeanFieldLayout::Padded { columns: c },
                c => MeanFieldLayout::Truncated { columns: c },
            };
            let field = DMatrix::from_fn(n, 4, |i, c| {
                if c < cols {
                    array.data[i * cols + c]
                } else {
                    0.0
                }
            });
            MeanFieldCheck::Normalized { field, layout }
        }
        shape => MeanFieldCheck::Degraded {
            field: DMatrix::zeros(n, 4),
            reason: format!("mean field shape {:?} does not match {} points", shape, n),
        },
    }
}
