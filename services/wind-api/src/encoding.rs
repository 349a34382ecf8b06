//! Binary array encoding for JSON payloads.
//!
//! Grids travel as flat row-major `f32` arrays, little-endian, base64 with the
//! standard alphabet. NaN cells keep their bit pattern.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Encode `values` as base64 of their little-endian bytes.
pub fn encode_f32_le(values: &[f32]) -> String {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    BASE64.encode(bytes)
}

/// Decode a payload produced by [`encode_f32_le`].
pub fn decode_f32_le(encoded: &str) -> Result<Vec<f32>, DecodeError> {
    let bytes = BASE64.decode(encoded)?;
    if bytes.len() % 4 != 0 {
        return Err(DecodeError::Length(bytes.len()));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("byte length {0} is not a multiple of 4")]
    Length(usize),
}
