//! Mapbox response types and the domain values built from them.
//!
//! Only the fields the locator reads are modelled; everything else in the
//! responses is ignored by serde.

use concession_core::Coordinate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Geocoding v5
// ---------------------------------------------------------------------------

/// `GET /geocoding/v5/mapbox.places/{query}.json`
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub id: String,
    /// Full label, e.g. `"69007 Lyon, Rhône, France"`.
    pub place_name: String,
    /// Short label, e.g. `"69007"`.
    #[serde(default)]
    pub text: String,
    /// `[lon, lat]`.
    pub center: [f64; 2],
}

/// An autocomplete candidate for a partially typed address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressSuggestion {
    pub id: String,
    pub display_name: String,
    pub short_label: String,
    pub coordinate: Coordinate,
}

impl From<Feature> for AddressSuggestion {
    fn from(feature: Feature) -> Self {
        let short_label = if feature.text.is_empty() {
            feature.place_name.clone()
        } else {
            feature.text
        };
        Self {
            id: feature.id,
            display_name: feature.place_name,
            short_label,
            coordinate: Coordinate::from(feature.center),
        }
    }
}

// ---------------------------------------------------------------------------
// Directions v5
// ---------------------------------------------------------------------------

/// `GET /directions/v5/mapbox/driving/{coordinates}`
#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    /// `"Ok"` on success, otherwise e.g. `"NoRoute"`.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
pub struct Route {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    pub geometry: Geometry,
}

/// GeoJSON `LineString`.
#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

/// A computed driving route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub path: Vec<Coordinate>,
}

impl RouteResult {
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    #[must_use]
    pub fn duration_min(&self) -> f64 {
        self.duration_seconds / 60.0
    }
}

impl From<Route> for RouteResult {
    fn from(route: Route) -> Self {
        Self {
            distance_meters: route.distance,
            duration_seconds: route.duration,
            path: route
                .geometry
                .coordinates
                .into_iter()
                .map(Coordinate::from)
                .collect(),
        }
    }
}
