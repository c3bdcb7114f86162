//! WGS84 coordinates.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A `(longitude, latitude)` pair in degrees.
///
/// Only range is ever checked; a coordinate that fails [`Coordinate::is_valid`]
/// is still carried around and surfaces downstream as "distance unknown".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// `true` when both components are finite and inside the WGS84 range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("expected \"lon,lat\", got \"{0}\"")]
pub struct CoordinateParseError(String);

impl FromStr for Coordinate {
    type Err = CoordinateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lon, lat) = s
            .split_once(',')
            .ok_or_else(|| CoordinateParseError(s.to_owned()))?;
        let lon = lon
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordinateParseError(s.to_owned()))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordinateParseError(s.to_owned()))?;
        Ok(Self { lon, lat })
    }
}
