//! Grid size limit checks.

use crate::config::LimitsConfig;

/// Requested grid dimensions.
#[derive(Debug, Clone, Copy)]
pub struct GridRequest {
    pub nx: usize,
    pub ny: usize,
}

impl GridRequest {
    pub fn cells(&self) -> usize {
        self.nx.saturating_mul(self.ny)
    }

    /// Estimated payload size: u and v, plus lon and lat when coordinates are
    /// included, base64 encoded.
    pub fn estimated_bytes(&self, include_coords: bool) -> usize {
        let arrays = if include_coords { 4 } else { 2 };
        let raw = self.cells().saturating_mul(4).saturating_mul(arrays);
        raw.saturating_mul(4) / 3
    }

    /// Check this request against the configured limits.
    pub fn check_limits(&self, limits: &LimitsConfig) -> Result<(), LimitExceeded> {
        for (param, value) in [("nx", self.nx), ("ny", self.ny)] {
            if value == 0 || value > limits.max_grid_dim {
                return Err(LimitExceeded::DimensionOutOfRange {
                    param,
                    requested: value,
                    limit: limits.max_grid_dim,
                });
            }
        }

        if self.cells() > limits.max_grid_cells {
            return Err(LimitExceeded::TooManyCells {
                requested: self.cells(),
                limit: limits.max_grid_cells,
            });
        }

        Ok(())
    }
}

/// Limit exceeded error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitExceeded {
    DimensionOutOfRange {
        param: &'static str,
        requested: usize,
        limit: usize,
    },
    TooManyCells {
        requested: usize,
        limit: usize,
    },
}

impl LimitExceeded {
    /// Name of the offending query parameter.
    pub fn param(&self) -> &'static str {
        match self {
            LimitExceeded::DimensionOutOfRange { param, .. } => *param,
            LimitExceeded::TooManyCells { .. } => "nx*ny",
        }
    }
}

impl std::fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitExceeded::DimensionOutOfRange {
                param,
                requested,
                limit,
            } => {
                write!(f, "{} must be in 1..={}, got {}", param, limit, requested)
            }
            LimitExceeded::TooManyCells { requested, limit } => {
                write!(
                    f,
                    "Too many grid cells: {} requested, limit is {}",
                    requested, limit
                )
            }
        }
    }
}

impl std::error::Error for LimitExceeded {}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> LimitsConfig {
        LimitsConfig {
            max_grid_dim: 100,
            max_grid_cells: 2_000,
        }
    }

    #[test]
    fn test_within_limits() {
        let req = GridRequest { nx: 40, ny: 50 };
        assert!(req.check_limits(&limits()).is_ok());
    }

    #[test]
    fn test_zero_dimension() {
        let req = GridRequest { nx: 0, ny: 5 };
        let err = req.check_limits(&limits()).unwrap_err();
        assert_eq!(err.param(), "nx");
    }

    #[test]
    fn test_dimension_too_large() {
        let req = GridRequest { nx: 5, ny: 101 };
        let err = req.check_limits(&limits()).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::DimensionOutOfRange {
                param: "ny",
                requested: 101,
                limit: 100
            }
        );
        assert_eq!(err.to_string(), "ny must be in 1..=100, got 101");
    }

    #[test]
    fn test_too_many_cells() {
        let req = GridRequest { nx: 50, ny: 41 };
        let err = req.check_limits(&limits()).unwrap_err();
        assert!(matches!(err, LimitExceeded::TooManyCells { requested: 2050, .. }));
    }

    #[test]
    fn test_estimated_bytes() {
        let req = GridRequest { nx: 3, ny: 1 };
        assert_eq!(req.estimated_bytes(false), 32);
        assert_eq!(req.estimated_bytes(true), 64);
    }
}
