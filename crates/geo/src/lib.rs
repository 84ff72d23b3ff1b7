//! Geospatial math for SmokeSpot.
//!
//! This crate provides:
//! - Haversine great-circle distance
//! - Coordinate parsing and range validation
//! - Proximity ranking with optional parallelism
//!
//! # Example
//!
//! ```
//! use smokespot_geo::{haversine_distance, Coordinate};
//!
//! let taipei_101 = Coordinate::new(25.0330, 121.5654);
//! let yonghe = Coordinate::new(25.0120, 121.5064);
//!
//! let distance_km = haversine_distance(&taipei_101, &yonghe);
//! assert!(distance_km > 6.1 && distance_km < 6.3);
//! ```

mod haversine;
pub mod batch;
mod error;

use std::fmt;
use std::str::FromStr;

pub use haversine::{haversine_distance, EARTH_RADIUS_KM};
pub use batch::{calculate_distances, calculate_distances_sorted, calculate_distances_within_radius, DistanceResult, Located};
pub use error::{GeoError, GeoErrorCode, Result};

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate without range checks.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Creates a coordinate, rejecting values outside the valid ranges.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self::new(latitude, longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "({latitude}, {longitude}) is outside [-90, 90] x [-180, 180]"
            )))
        }
    }

    /// Returns true if the coordinate has valid values.
    ///
    /// NaN and infinite components are never valid.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lng"` (whitespace around either part is ignored).
impl FromStr for Coordinate {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| GeoError::InvalidCoordinate(format!("expected \"lat,lng\", got {s:?}")))?;

        let parse = |part: &str, axis: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| GeoError::InvalidCoordinate(format!("bad {axis} {part:?}: {e}")))
        };

        Self::try_new(parse(lat, "latitude")?, parse(lng, "longitude")?)
    }
}
