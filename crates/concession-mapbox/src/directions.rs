//! Driving routes between two coordinates.

use concession_core::Coordinate;

use crate::client::{endpoint_label, MapboxClient};
use crate::error::MapboxError;
use crate::types::{DirectionsResponse, RouteResult};

/// Client for the `mapbox/driving` directions profile.
///
/// A single attempt per call: there is no retry, callers decide how a
/// failure is surfaced.
#[derive(Debug, Clone)]
pub struct RoutingClient {
    client: MapboxClient,
}

impl RoutingClient {
    #[must_use]
    pub fn new(client: MapboxClient) -> Self {
        Self { client }
    }

    /// Computes the driving route from `origin` to `destination`.
    ///
    /// # Errors
    ///
    /// - [`MapboxError::RouteUnavailable`] on a non-2xx status or when the
    ///   response carries zero routes.
    /// - [`MapboxError::Http`] on network failure.
    /// - [`MapboxError::Deserialize`] if a 2xx body does not match the
    ///   expected shape.
    pub async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResult, MapboxError> {
        let waypoints = format!(
            "{},{};{},{}",
            origin.lon, origin.lat, destination.lon, destination.lat
        );
        let url = self.client.build_url(
            &["directions", "v5", "mapbox", "driving", &waypoints],
            &[("geometries", "geojson"), ("overview", "full")],
        );

        let (status, body) = self.client.get_text(&url).await?;
        if !status.is_success() {
            // Mapbox puts a human readable reason in `message` on 4xx.
            let reason = serde_json::from_str::<DirectionsResponse>(&body)
                .ok()
                .and_then(|r| r.message.or(r.code))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            tracing::debug!(
                status = status.as_u16(),
                endpoint = %endpoint_label(&url),
                reason = %reason,
                "directions request failed"
            );
            return Err(MapboxError::RouteUnavailable { reason });
        }

        let parsed: DirectionsResponse =
            serde_json::from_str(&body).map_err(|e| MapboxError::Deserialize {
                context: format!("directions({waypoints})"),
                source: e,
            })?;

        let code = parsed.code.unwrap_or_else(|| "Ok".to_owned());
        parsed
            .routes
            .into_iter()
            .next()
            .map(RouteResult::from)
            .ok_or(MapboxError::RouteUnavailable { reason: code })
    }
}
