//! Per-page state owned by the presenter.

use concession_core::Coordinate;
use concession_mapbox::RouteResult;

use crate::markers::MarkerBoard;
use crate::sorter::FacilityRecord;

/// Issued when a resolution or route flow starts. Only the latest ticket of
/// each kind may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolutionTicket(u64);

impl ResolutionTicket {
    #[must_use]
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Holds the one active user coordinate, the facility list and marker
/// states for a page.
#[derive(Debug, Default)]
pub struct MapSession {
    user_coordinate: Option<Coordinate>,
    facilities: Vec<FacilityRecord>,
    markers: MarkerBoard,
    generation: u64,
    route_generation: u64,
    active_route: Option<(String, RouteResult)>,
}

impl MapSession {
    #[must_use]
    pub fn new(facilities: Vec<FacilityRecord>) -> Self {
        let markers = MarkerBoard::new(facilities.iter().map(|f| f.id.clone()));
        Self {
            facilities,
            markers,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn user_coordinate(&self) -> Option<Coordinate> {
        self.user_coordinate
    }

    #[must_use]
    pub fn facilities(&self) -> &[FacilityRecord] {
        &self.facilities
    }

    #[must_use]
    pub fn facility(&self, id: &str) -> Option<&FacilityRecord> {
        self.facilities.iter().find(|f| f.id == id)
    }

    pub fn markers_mut(&mut self) -> &mut MarkerBoard {
        &mut self.markers
    }

    #[must_use]
    pub fn markers(&self) -> &MarkerBoard {
        &self.markers
    }

    #[must_use]
    pub fn active_route(&self) -> Option<&(String, RouteResult)> {
        self.active_route.as_ref()
    }

    /// Starts a new location flow, superseding every earlier one.
    pub fn begin_resolution(&mut self) -> ResolutionTicket {
        self.generation += 1;
        ResolutionTicket(self.generation)
    }

    #[must_use]
    pub fn is_current(&self, ticket: ResolutionTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Installs a newly resolved coordinate. Every computed distance is
    /// dropped. Returns `false` without touching state if `ticket` is stale.
    pub fn apply_user_coordinate(&mut self, ticket: ResolutionTicket, coordinate: Coordinate) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                stale = ticket.0,
                current = self.generation,
                "dropping superseded location result"
            );
            return false;
        }
        self.user_coordinate = Some(coordinate);
        for facility in &mut self.facilities {
            facility.invalidate();
        }
        true
    }

    /// Replaces the facility list with a ranked one, if `ticket` is current.
    pub fn apply_ranking(&mut self, ticket: ResolutionTicket, ranked: Vec<FacilityRecord>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.facilities = ranked;
        true
    }

    pub fn begin_route(&mut self) -> ResolutionTicket {
        self.route_generation += 1;
        ResolutionTicket(self.route_generation)
    }

    /// Stores `route` as the only active one. Returns `false` if a newer
    /// directions request has started since `ticket` was issued.
    pub fn apply_route(
        &mut self,
        ticket: ResolutionTicket,
        facility_id: &str,
        route: RouteResult,
    ) -> bool {
        if ticket.0 != self.route_generation {
            return false;
        }
        self.active_route = Some((facility_id.to_owned(), route));
        true
    }

    /// Returns `true` if a route was active.
    pub fn clear_route(&mut self) -> bool {
        self.active_route.take().is_some()
    }

    #[must_use]
    pub fn is_current_route(&self, ticket: ResolutionTicket) -> bool {
        ticket.0 == self.route_generation
    }
}
