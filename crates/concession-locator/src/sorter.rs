//! Ranking facilities by driving distance from the user.

use std::cmp::Ordering;
use std::time::Duration;

use concession_core::{Coordinate, FacilityConfig};
use concession_mapbox::{MapboxError, RouteResult};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::debounce::Debouncer;
use crate::ports::Router;

/// Delay between two consecutive route requests of one ranking pass.
pub const DEFAULT_ROUTE_PACING: Duration = Duration::from_millis(150);
pub const DEFAULT_REORDER_DELAY: Duration = Duration::from_millis(500);

/// Driving distance from the user to a facility.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "kind", content = "km", rename_all = "lowercase")]
pub enum Distance {
    Known(f64),
    #[default]
    Unknown,
}

impl Distance {
    #[must_use]
    pub fn km(self) -> Option<f64> {
        match self {
            Distance::Known(km) => Some(km),
            Distance::Unknown => None,
        }
    }

    /// Ascending by kilometres; every `Unknown` after every known value.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Distance::Known(a), Distance::Known(b)) => a.total_cmp(b),
            (Distance::Known(_), Distance::Unknown) => Ordering::Less,
            (Distance::Unknown, Distance::Known(_)) => Ordering::Greater,
            (Distance::Unknown, Distance::Unknown) => Ordering::Equal,
        }
    }
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distance::Known(km) => write!(f, "{km:.1} km"),
            Distance::Unknown => f.write_str("distance inconnue"),
        }
    }
}

/// A rendered facility and its distance from the current user coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    pub coordinate: Coordinate,
    pub distance: Distance,
    pub route_duration_min: Option<f64>,
}

impl FacilityRecord {
    /// Forgets any computed distance.
    pub fn invalidate(&mut self) {
        self.distance = Distance::Unknown;
        self.route_duration_min = None;
    }
}

impl From<&FacilityConfig> for FacilityRecord {
    fn from(config: &FacilityConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            address: config.full_address(),
            coordinate: config.coordinate(),
            distance: Distance::Unknown,
            route_duration_min: None,
        }
    }
}

/// Stable sort, unknown distances last.
pub fn sort_by_distance(facilities: &mut [FacilityRecord]) {
    facilities.sort_by(|a, b| a.distance.rank_cmp(&b.distance));
}

/// Computes route distances one facility at a time.
#[derive(Debug)]
pub struct DistanceSorter<R> {
    router: R,
    pacing: Duration,
}

impl<R: Router> DistanceSorter<R> {
    pub fn new(router: R) -> Self {
        Self::with_pacing(router, DEFAULT_ROUTE_PACING)
    }

    pub fn with_pacing(router: R, pacing: Duration) -> Self {
        Self { router, pacing }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// A single route request, used for "get directions".
    ///
    /// # Errors
    ///
    /// Returns the router's [`MapboxError`] unchanged.
    pub async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResult, MapboxError> {
        self.router.route(origin, destination).await
    }

    /// Recomputes every facility's distance from `origin` and returns them
    /// ranked.
    ///
    /// Requests run strictly in sequence with the pacing delay between
    /// them. A facility whose route fails, or whose coordinate is invalid,
    /// ends up `Unknown`; the pass never aborts.
    pub async fn rank_by_distance(
        &self,
        origin: Coordinate,
        mut facilities: Vec<FacilityRecord>,
    ) -> Vec<FacilityRecord> {
        let mut requested = 0_usize;
        for facility in &mut facilities {
            facility.invalidate();
            if !origin.is_valid() || !facility.coordinate.is_valid() {
                tracing::debug!(facility = %facility.id, "skipping route for invalid coordinate");
                continue;
            }

            if requested > 0 {
                tokio::time::sleep(self.pacing).await;
            }
            requested += 1;

            match self.router.route(origin, facility.coordinate).await {
                Ok(route) => {
                    facility.distance = Distance::Known(route.distance_km());
                    facility.route_duration_min = Some(route.duration_min());
                }
                Err(e) => {
                    tracing::warn!(facility = %facility.id, error = %e, "route failed, distance unknown");
                }
            }
        }

        sort_by_distance(&mut facilities);
        tracing::info!(
            facilities = facilities.len(),
            routed = requested,
            "ranked facilities by distance"
        );
        facilities
    }
}

/// Collapses bursts of reorder requests; the last value sent within the
/// window is delivered once it settles.
pub struct ReorderScheduler<T> {
    debouncer: Debouncer<()>,
    delay: Duration,
    sink: mpsc::UnboundedSender<T>,
}

impl<T> std::fmt::Debug for ReorderScheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReorderScheduler")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> ReorderScheduler<T> {
    #[must_use]
    pub fn new(delay: Duration, sink: mpsc::UnboundedSender<T>) -> Self {
        Self {
            debouncer: Debouncer::new(),
            delay,
            sink,
        }
    }

    pub fn request(&self, value: T) {
        let sink = self.sink.clone();
        self.debouncer.schedule((), self.delay, async move {
            // The receiver going away means the page unloaded.
            let _ = sink.send(value);
        });
    }

    pub fn cancel(&self) {
        self.debouncer.cancel(&());
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending(&())
    }
}

#[cfg(test)]
#[path = "sorter_test.rs"]
mod tests;
