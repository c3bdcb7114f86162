//! In-memory stand-ins for the Mapbox services, the position source and
//! the map surface.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use concession_core::Coordinate;
use concession_locator::{
    Distance, FacilityRecord, GeolocationError, Geocoder, MapSurface, PositionOptions,
    PositionProvider, Router,
};
use concession_mapbox::{AddressSuggestion, MapboxError, RouteResult};

pub const LYON: Coordinate = Coordinate::new(4.8357, 45.764);
pub const PARIS: Coordinate = Coordinate::new(2.3522, 48.8566);

pub fn facility(id: &str, lon: f64, lat: f64) -> FacilityRecord {
    FacilityRecord {
        id: id.to_owned(),
        name: format!("Concession {id}"),
        address: format!("1 rue de {id}"),
        coordinate: Coordinate::new(lon, lat),
        distance: Distance::Unknown,
        route_duration_min: None,
    }
}

/// Three facilities; `marseille` has no route in [`FakeRouter::standard`].
pub fn facilities() -> Vec<FacilityRecord> {
    vec![
        facility("marseille", 5.37, 43.29),
        facility("villeurbanne", 4.88, 45.77),
        facility("grenoble", 5.72, 45.18),
    ]
}

#[derive(Clone, Default)]
pub struct FakeGeocoder {
    addresses: HashMap<String, (Coordinate, Duration)>,
}

impl FakeGeocoder {
    pub fn with(mut self, address: &str, at: Coordinate) -> Self {
        self.addresses.insert(address.to_owned(), (at, Duration::ZERO));
        self
    }

    pub fn with_delay(mut self, address: &str, at: Coordinate, delay: Duration) -> Self {
        self.addresses.insert(address.to_owned(), (at, delay));
        self
    }
}

impl Geocoder for FakeGeocoder {
    async fn suggest(&self, _query: &str) -> Vec<AddressSuggestion> {
        Vec::new()
    }

    async fn geocode(&self, address: &str) -> Result<Coordinate, MapboxError> {
        match self.addresses.get(address) {
            Some((at, delay)) => {
                tokio::time::sleep(*delay).await;
                Ok(*at)
            }
            None => Err(MapboxError::NotFound {
                query: address.to_owned(),
            }),
        }
    }
}

/// Distance in km keyed by destination facility longitude.
#[derive(Clone, Default)]
pub struct FakeRouter {
    km_by_lon: Vec<(f64, f64)>,
    calls: Arc<Mutex<usize>>,
}

impl FakeRouter {
    /// From Lyon: villeurbanne 6 km, grenoble 110 km, marseille fails.
    pub fn standard() -> Self {
        Self {
            km_by_lon: vec![(4.88, 6.0), (5.72, 110.0)],
            calls: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Router for FakeRouter {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResult, MapboxError> {
        *self.calls.lock().unwrap() += 1;
        self.km_by_lon
            .iter()
            .find(|(lon, _)| (lon - destination.lon).abs() < 1e-9)
            .map(|(_, km)| RouteResult {
                distance_meters: km * 1000.0,
                duration_seconds: km * 50.0,
                path: vec![origin, destination],
            })
            .ok_or_else(|| MapboxError::RouteUnavailable {
                reason: "NoRoute".to_owned(),
            })
    }
}

pub struct SlowPosition {
    pub at: Result<Coordinate, GeolocationError>,
    pub delay: Duration,
}

impl PositionProvider for SlowPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, GeolocationError> {
        tokio::time::sleep(self.delay).await;
        self.at
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    RenderMarkers(Vec<String>),
    RenderList(Vec<String>),
    ShowPopup(String),
    HidePopup(String),
    Highlight(String, bool),
    PlaceUserMarker(Coordinate),
    RemoveUserMarker,
    DrawRoute(String),
    ClearRoute,
    SetAddressInput(String),
    Focus(Coordinate),
    Alert(String),
}

/// Records every call so tests can inspect what the page would show.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl RecordingSurface {
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SurfaceCall::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn last_list(&self) -> Option<Vec<String>> {
        self.calls().into_iter().rev().find_map(|c| match c {
            SurfaceCall::RenderList(ids) => Some(ids),
            _ => None,
        })
    }

    /// User markers on screen after replaying every place/remove call.
    pub fn user_markers_on_screen(&self) -> i32 {
        self.calls().iter().fold(0, |n, c| match c {
            SurfaceCall::PlaceUserMarker(_) => n + 1,
            SurfaceCall::RemoveUserMarker => n - 1,
            _ => n,
        })
    }

    /// Routes on screen after replaying every draw/clear call.
    pub fn routes_on_screen(&self) -> usize {
        self.calls().iter().fold(0, |n, c| match c {
            SurfaceCall::DrawRoute(_) => n + 1,
            SurfaceCall::ClearRoute => 0,
            _ => n,
        })
    }

    pub fn count(&self, pred: impl Fn(&SurfaceCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn push(&self, call: SurfaceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn ids(facilities: &[FacilityRecord]) -> Vec<String> {
    facilities.iter().map(|f| f.id.clone()).collect()
}

impl MapSurface for RecordingSurface {
    fn render_markers(&mut self, facilities: &[FacilityRecord]) {
        self.push(SurfaceCall::RenderMarkers(ids(facilities)));
    }

    fn render_list(&mut self, facilities: &[FacilityRecord]) {
        self.push(SurfaceCall::RenderList(ids(facilities)));
    }

    fn show_popup(&mut self, facility: &FacilityRecord) {
        self.push(SurfaceCall::ShowPopup(facility.id.clone()));
    }

    fn hide_popup(&mut self, facility_id: &str) {
        self.push(SurfaceCall::HidePopup(facility_id.to_owned()));
    }

    fn set_highlight(&mut self, facility_id: &str, highlighted: bool) {
        self.push(SurfaceCall::Highlight(facility_id.to_owned(), highlighted));
    }

    fn place_user_marker(&mut self, at: Coordinate) {
        self.push(SurfaceCall::PlaceUserMarker(at));
    }

    fn remove_user_marker(&mut self) {
        self.push(SurfaceCall::RemoveUserMarker);
    }

    fn draw_route(&mut self, facility: &FacilityRecord, _route: &RouteResult) {
        self.push(SurfaceCall::DrawRoute(facility.id.clone()));
    }

    fn clear_route(&mut self) {
        self.push(SurfaceCall::ClearRoute);
    }

    fn set_address_input(&mut self, address: &str) {
        self.push(SurfaceCall::SetAddressInput(address.to_owned()));
    }

    fn focus(&mut self, at: Coordinate) {
        self.push(SurfaceCall::Focus(at));
    }

    fn alert(&mut self, message: &str) {
        self.push(SurfaceCall::Alert(message.to_owned()));
    }
}
