//! Seams between the locator and the services it depends on.
//!
//! The Mapbox clients implement [`Geocoder`] and [`Router`]; the platform
//! position source is a [`PositionProvider`]. Tests substitute in-memory
//! implementations.

use std::future::Future;
use std::time::Duration;

use concession_core::Coordinate;
use concession_mapbox::{AddressSuggestion, GeocodingClient, MapboxError, RouteResult, RoutingClient};

use crate::error::GeolocationError;

pub trait Geocoder: Send + Sync {
    fn suggest(&self, query: &str) -> impl Future<Output = Vec<AddressSuggestion>> + Send;

    fn geocode(&self, address: &str)
        -> impl Future<Output = Result<Coordinate, MapboxError>> + Send;
}

pub trait Router: Send + Sync {
    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = Result<RouteResult, MapboxError>> + Send;
}

impl Geocoder for GeocodingClient {
    fn suggest(&self, query: &str) -> impl Future<Output = Vec<AddressSuggestion>> + Send {
        GeocodingClient::suggest(self, query)
    }

    fn geocode(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Coordinate, MapboxError>> + Send {
        GeocodingClient::geocode(self, address)
    }
}

impl Router for RoutingClient {
    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = Result<RouteResult, MapboxError>> + Send {
        RoutingClient::route(self, origin, destination)
    }
}

/// Options passed to the position source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Coarse fixes are preferred: they arrive faster and rarely time out.
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// A previous fix younger than this is reused without asking again.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: false,
            timeout: Duration::from_secs(30),
            maximum_age: Duration::from_secs(5 * 60),
        }
    }
}

/// The platform location API.
pub trait PositionProvider: Send + Sync {
    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Coordinate, GeolocationError>> + Send;
}

/// A position fixed ahead of time, e.g. from configuration or a CLI flag.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinate);

impl PositionProvider for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, GeolocationError> {
        if self.0.is_valid() {
            Ok(self.0)
        } else {
            Err(GeolocationError::PositionUnavailable)
        }
    }
}

/// Used when no position source is available: every request is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedPosition;

impl PositionProvider for DeniedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }
}
