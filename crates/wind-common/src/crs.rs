//! Coordinate Reference System codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// CRS codes understood by the wind service.
///
/// Datasets are stored in a UTM zone; clients talk WGS84 longitude/latitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Wgs84,
    /// WGS84 / UTM zone (meters)
    Utm { zone: u8, north: bool },
}

impl CrsCode {
    /// Parse a CRS identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326", "CRS:84"
    /// - "EPSG:32632" (UTM 32N), "EPSG:32733" (UTM 33S)
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        if normalized == "EPSG:4326" || normalized == "CRS:84" {
            return Ok(CrsCode::Wgs84);
        }

        let code: u32 = normalized
            .strip_prefix("EPSG:")
            .and_then(|c| c.parse().ok())
            .ok_or_else(|| CrsParseError::UnsupportedCrs(s.to_string()))?;

        let (zone, north) = match code {
            32601..=32660 => (code - 32600, true),
            32701..=32760 => (code - 32700, false),
            _ => return Err(CrsParseError::UnsupportedCrs(s.to_string())),
        };

        Ok(CrsCode::Utm {
            zone: zone as u8,
            north,
        })
    }

    /// Check if this is a geographic (lon/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Wgs84)
    }

    /// Numeric EPSG code.
    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Wgs84 => 4326,
            CrsCode::Utm { zone, north: true } => 32600 + *zone as u32,
            CrsCode::Utm { zone, north: false } => 32700 + *zone as u32,
        }
    }
}

impl FromStr for CrsCode {
    type Err = CrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(CrsCode::parse("EPSG:4326").unwrap(), CrsCode::Wgs84);
        assert_eq!(CrsCode::parse("crs:84").unwrap(), CrsCode::Wgs84);
        assert_eq!(
            CrsCode::parse("epsg:32632").unwrap(),
            CrsCode::Utm {
                zone: 32,
                north: true
            }
        );
        assert_eq!(
            CrsCode::parse("EPSG:32733").unwrap(),
            CrsCode::Utm {
                zone: 33,
                north: false
            }
        );
        assert!(CrsCode::parse("EPSG:3857").is_err());
        assert!(CrsCode::parse("EPSG:32661").is_err());
        assert!(CrsCode::parse("utm").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for code in ["EPSG:4326", "EPSG:32601", "EPSG:32760"] {
            let crs: CrsCode = code.parse().unwrap();
            assert_eq!(crs.to_string(), code);
        }
    }
}
