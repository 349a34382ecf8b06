//! Common test fixtures for wind field tests.
//!
//! This module provides pre-defined extents, CRS codes and request
//! parameters shared by the engine and service tests.

/// Common extents as (min_x, min_y, max_x, max_y).
pub mod extent {
    /// 1 km x 1 km block in UTM zone 32N, near Oslo
    pub const OSLO_UTM32N: (f64, f64, f64, f64) = (597_000.0, 6_642_000.0, 598_000.0, 6_643_000.0);

    /// Lon/lat box enclosing `OSLO_UTM32N`
    pub const OSLO_LONLAT: (f64, f64, f64, f64) = (10.70, 59.89, 10.80, 59.92);

    /// Far away from every other fixture
    pub const DISJOINT: (f64, f64, f64, f64) = (-1.0e7, -1.0e7, -9.0e6, -9.0e6);
}

/// Common CRS identifiers.
pub mod crs {
    /// UTM zone 32 north (southern Norway)
    pub const EPSG_32632: &str = "EPSG:32632";
}

/// Common dataset identifiers.
pub mod datasets {
    /// Synthetic dataset id used by service tests
    pub const SYNTHETIC: &str = "synthetic";

    /// Heights written for the synthetic dataset
    pub const HEIGHTS: [u32; 2] = [100, 20];
}

/// Wind query parameters for HTTP testing.
pub mod wind {
    /// Parameters of a `/api/wind` request.
    #[derive(Debug, Clone)]
    pub struct WindParams {
        pub dataset_id: &'static str,
        pub height_meters: u32,
        pub min_lon: f64,
        pub min_lat: f64,
        pub max_lon: f64,
        pub max_lat: f64,
        pub nx: usize,
        pub ny: usize,
        pub ws_ref: Option<f64>,
        pub wd_ref: Option<f64>,
        pub include_coords: Option<bool>,
    }

    /// Default wind parameters for testing.
    pub const DEFAULT_WIND: WindParams = WindParams {
        dataset_id: super::datasets::SYNTHETIC,
        height_meters: 100,
        min_lon: super::extent::OSLO_LONLAT.0,
        min_lat: super::extent::OSLO_LONLAT.1,
        max_lon: super::extent::OSLO_LONLAT.2,
        max_lat: super::extent::OSLO_LONLAT.3,
        nx: 8,
        ny: 6,
        ws_ref: None,
        wd_ref: None,
        include_coords: None,
    };

    impl WindParams {
        /// Converts parameters to a query string.
        pub fn to_query_string(&self) -> String {
            let mut query = format!(
                "datasetId={}&heightMeters={}&minLon={}&minLat={}&maxLon={}&maxLat={}&nx={}&ny={}",
                self.dataset_id,
                self.height_meters,
                self.min_lon,
                self.min_lat,
                self.max_lon,
                self.max_lat,
                self.nx,
                self.ny
            );
            if let Some(ws) = self.ws_ref {
                query.push_str(&format!("&wsRef={}", ws));
            }
            if let Some(wd) = self.wd_ref {
                query.push_str(&format!("&wdRef={}", wd));
            }
            if let Some(include) = self.include_coords {
                query.push_str(&format!("&includeCoords={}", include));
            }
            query
        }

        /// Full request URI for `/api/wind`.
        pub fn to_uri(&self) -> String {
            format!("/api/wind?{}", self.to_query_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lonlat_box_is_ordered() {
        let (min_lon, min_lat, max_lon, max_lat) = extent::OSLO_LONLAT;
        assert!(min_lon < max_lon);
        assert!(min_lat < max_lat);
    }

    #[test]
    fn test_wind_query_string() {
        let query = wind::DEFAULT_WIND.to_query_string();
        assert!(query.starts_with("datasetId=synthetic&heightMeters=100"));
        assert!(query.contains("nx=8&ny=6"));
        assert!(!query.contains("wsRef"));

        let params = wind::WindParams {
            ws_ref: Some(2.5),
            include_coords: Some(false),
            ..wind::DEFAULT_WIND
        };
        let uri = params.to_uri();
        assert!(uri.starts_with("/api/wind?"));
        assert!(uri.contains("&wsRef=2.5"));
        assert!(uri.ends_with("&includeCoords=false"));
    }
}
