//! The map page's event loop.
//!
//! [`MapPresenter`] owns the [`MapSession`] and a [`MapSurface`]. UI input
//! arrives as [`MapEvent`]s; network work and timers run as tokio tasks
//! whose results are fed back into the same loop, so session state is only
//! ever touched from one place.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use concession_core::Coordinate;
use concession_mapbox::RouteResult;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinError, JoinHandle, JoinSet};

use crate::cta::LocateSignal;
use crate::debounce::Debouncer;
use crate::error::LocateError;
use crate::intent::{IntentStore, LocateIntent};
use crate::markers::{MarkerEffect, MarkerInput};
use crate::page::PageReady;
use crate::ports::{Geocoder, PositionProvider, Router};
use crate::resolver::LocationResolver;
use crate::session::{MapSession, ResolutionTicket};
use crate::sorter::{DistanceSorter, FacilityRecord, ReorderScheduler, DEFAULT_REORDER_DELAY};

/// The map widget and facility list.
pub trait MapSurface: Send {
    fn render_markers(&mut self, facilities: &[FacilityRecord]);
    fn render_list(&mut self, facilities: &[FacilityRecord]);
    fn show_popup(&mut self, facility: &FacilityRecord);
    fn hide_popup(&mut self, facility_id: &str);
    fn set_highlight(&mut self, facility_id: &str, highlighted: bool);
    fn place_user_marker(&mut self, at: Coordinate);
    fn remove_user_marker(&mut self);
    /// Draws `route` and fills the info panel for `facility`.
    fn draw_route(&mut self, facility: &FacilityRecord, route: &RouteResult);
    fn clear_route(&mut self);
    fn set_address_input(&mut self, address: &str);
    fn focus(&mut self, at: Coordinate);
    /// Blocking, user-facing error.
    fn alert(&mut self, message: &str);
}

/// User input delivered to the presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    MarkerEnter(String),
    MarkerLeave(String),
    MarkerClick(String),
    /// Click on empty map canvas.
    MapClick,
    SearchAddress(String),
    Geolocate,
    ShowDirections(String),
    Unload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenterTimings {
    pub popup_dismiss: Duration,
    pub reorder: Duration,
}

impl Default for PresenterTimings {
    fn default() -> Self {
        Self {
            popup_dismiss: Duration::from_millis(300),
            reorder: DEFAULT_REORDER_DELAY,
        }
    }
}

/// Results fed back into the loop by tasks and timers.
#[derive(Debug)]
enum Internal {
    DismissElapsed { facility_id: String, generation: u64 },
    Resolved {
        ticket: ResolutionTicket,
        result: Result<Coordinate, LocateError>,
    },
    IntentRedeemed {
        ticket: ResolutionTicket,
        intent: LocateIntent,
        result: Result<Coordinate, LocateError>,
    },
    IntentAbsent,
    Ranked {
        ticket: ResolutionTicket,
        facilities: Vec<FacilityRecord>,
    },
    ReorderSettled {
        ticket: ResolutionTicket,
        facilities: Vec<FacilityRecord>,
    },
    RouteComputed {
        ticket: ResolutionTicket,
        facility_id: String,
        result: Result<RouteResult, LocateError>,
    },
}

enum Next {
    Ui(Option<MapEvent>),
    Internal(Option<Internal>),
    Task(Result<Internal, JoinError>),
}

pub struct MapPresenter<G, P, R> {
    session: MapSession,
    surface: Box<dyn MapSurface>,
    resolver: Arc<LocationResolver<G, P>>,
    sorter: Arc<DistanceSorter<R>>,
    timings: PresenterTimings,
    ui_tx: mpsc::UnboundedSender<MapEvent>,
    ui_rx: mpsc::UnboundedReceiver<MapEvent>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    tasks: JoinSet<Internal>,
    dismiss_timers: Debouncer<String>,
    /// Generation of the dismiss currently scheduled per marker. A timer
    /// whose message is still queued when it gets rescheduled is stale.
    dismiss_generations: HashMap<String, u64>,
    next_dismiss: u64,
    /// Latest resolution generation, readable from intent tasks.
    latest_resolution: Arc<AtomicU64>,
    reorder: ReorderScheduler<Internal>,
    listeners: Vec<JoinHandle<()>>,
    user_marker_placed: bool,
}

impl<G, P, R> std::fmt::Debug for MapPresenter<G, P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapPresenter")
            .field("session", &self.session)
            .field("timings", &self.timings)
            .field("in_flight", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl<G, P, R> MapPresenter<G, P, R>
where
    G: Geocoder + 'static,
    P: PositionProvider + 'static,
    R: Router + 'static,
{
    /// Renders the initial markers and list.
    ///
    /// Returns `None` when the page has no facility set, i.e. no map to
    /// drive. That is not an error.
    pub fn mount(
        mut surface: Box<dyn MapSurface>,
        facilities: Option<Vec<FacilityRecord>>,
        resolver: Arc<LocationResolver<G, P>>,
        sorter: Arc<DistanceSorter<R>>,
        timings: PresenterTimings,
    ) -> Option<Self> {
        let Some(facilities) = facilities else {
            tracing::debug!("no facilities on this page, map presenter not mounted");
            return None;
        };

        let session = MapSession::new(facilities);
        surface.render_markers(session.facilities());
        surface.render_list(session.facilities());
        tracing::info!(facilities = session.facilities().len(), "map presenter mounted");

        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let reorder = ReorderScheduler::new(timings.reorder, internal_tx.clone());

        Some(Self {
            session,
            surface,
            resolver,
            sorter,
            timings,
            ui_tx,
            ui_rx,
            internal_tx,
            internal_rx,
            tasks: JoinSet::new(),
            dismiss_timers: Debouncer::new(),
            dismiss_generations: HashMap::new(),
            next_dismiss: 0,
            latest_resolution: Arc::new(AtomicU64::new(0)),
            reorder,
            listeners: Vec::new(),
            user_marker_placed: false,
        })
    }

    /// Sender for UI events. Events are processed in the order sent.
    #[must_use]
    pub fn events(&self) -> mpsc::UnboundedSender<MapEvent> {
        self.ui_tx.clone()
    }

    #[must_use]
    pub fn session(&self) -> &MapSession {
        &self.session
    }

    /// Redeems the intent a call-to-action left before navigating here,
    /// once `ready` fires.
    ///
    /// A search started meanwhile supersedes the intent, which then stays in
    /// storage.
    pub fn redeem_pending_intent(&mut self, store: IntentStore, ready: PageReady) {
        let ticket = self.begin_resolution();
        let resolver = Arc::clone(&self.resolver);
        let latest = Arc::clone(&self.latest_resolution);
        self.tasks.spawn(async move {
            let superseded = || latest.load(Ordering::Acquire) != ticket.generation();
            match resolver
                .consume_pending_intent_unless(&store, &ready, superseded)
                .await
            {
                Some((intent, result)) => Internal::IntentRedeemed {
                    ticket,
                    intent,
                    result,
                },
                None => Internal::IntentAbsent,
            }
        });
    }

    /// Forwards same-page address broadcasts into the event loop.
    pub fn listen(&mut self, mut signals: broadcast::Receiver<LocateSignal>) {
        let events = self.ui_tx.clone();
        let handle = tokio::spawn(async move {
            loop {
                match signals.recv().await {
                    Ok(LocateSignal { address }) => {
                        if events.send(MapEvent::SearchAddress(address)).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "locate signals dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        self.listeners.push(handle);
    }

    /// Handles one UI event. Returns `false` once the page unloads.
    pub fn handle(&mut self, event: MapEvent) -> bool {
        tracing::trace!(?event, "map event");
        match event {
            MapEvent::MarkerEnter(id) => self.marker_input(&id, MarkerInput::Enter),
            MapEvent::MarkerLeave(id) => self.marker_input(&id, MarkerInput::Leave),
            MapEvent::MarkerClick(id) => self.marker_input(&id, MarkerInput::Click),
            MapEvent::MapClick => {
                let effects = self.session.markers_mut().clear_all();
                self.apply_effects(effects);
            }
            MapEvent::SearchAddress(address) => self.locate_by_address(&address),
            MapEvent::Geolocate => self.locate_by_geolocation(),
            MapEvent::ShowDirections(id) => self.show_directions(&id),
            MapEvent::Unload => {
                self.shutdown();
                return false;
            }
        }
        true
    }

    pub fn locate_by_address(&mut self, address: &str) {
        let address = address.trim().to_owned();
        if address.is_empty() {
            self.fail(&LocateError::AddressNotFound(address));
            return;
        }

        self.surface.set_address_input(&address);
        let ticket = self.begin_resolution();
        let resolver = Arc::clone(&self.resolver);
        self.tasks.spawn(async move {
            let result = resolver.resolve_from_address(&address).await;
            Internal::Resolved { ticket, result }
        });
    }

    pub fn locate_by_geolocation(&mut self) {
        let ticket = self.begin_resolution();
        let resolver = Arc::clone(&self.resolver);
        self.tasks.spawn(async move {
            let result = resolver.resolve_from_geolocation().await;
            Internal::Resolved { ticket, result }
        });
    }

    /// Routes from the user to `facility_id` and draws it, replacing any
    /// route on screen.
    pub fn show_directions(&mut self, facility_id: &str) {
        let Some(origin) = self.session.user_coordinate() else {
            self.fail(&LocateError::NoUserPosition);
            return;
        };
        let Some(destination) = self.session.facility(facility_id).map(|f| f.coordinate) else {
            tracing::debug!(facility = facility_id, "directions requested for unknown facility");
            return;
        };

        let ticket = self.session.begin_route();
        let sorter = Arc::clone(&self.sorter);
        let facility_id = facility_id.to_owned();
        self.tasks.spawn(async move {
            let result = sorter
                .route(origin, destination)
                .await
                .map_err(LocateError::from_route);
            Internal::RouteComputed {
                ticket,
                facility_id,
                result,
            }
        });
    }

    /// Waits for and handles the next event or task result. Returns `false`
    /// once the page unloads.
    pub async fn process_next(&mut self) -> bool {
        let next = tokio::select! {
            biased;
            event = self.ui_rx.recv() => Next::Ui(event),
            internal = self.internal_rx.recv() => Next::Internal(internal),
            Some(done) = self.tasks.join_next(), if !self.tasks.is_empty() => Next::Task(done),
        };

        match next {
            Next::Ui(Some(event)) => self.handle(event),
            Next::Internal(Some(internal)) | Next::Task(Ok(internal)) => {
                self.handle_internal(internal);
                true
            }
            Next::Task(Err(e)) => {
                tracing::error!(error = %e, "map task failed");
                true
            }
            Next::Ui(None) | Next::Internal(None) => false,
        }
    }

    /// Runs until [`MapEvent::Unload`].
    pub async fn run(mut self) {
        while self.process_next().await {}
    }

    /// Processes events until nothing is queued, in flight or scheduled.
    /// Returns `false` if the page unloaded meanwhile.
    pub async fn run_until_idle(&mut self) -> bool {
        while !self.is_idle() {
            if !self.process_next().await {
                return false;
            }
        }
        true
    }

    fn is_idle(&self) -> bool {
        self.ui_rx.is_empty()
            && self.internal_rx.is_empty()
            && self.tasks.is_empty()
            && !self.reorder.is_pending()
            && !self.dismiss_timers.has_pending()
    }

    fn begin_resolution(&mut self) -> ResolutionTicket {
        let ticket = self.session.begin_resolution();
        self.latest_resolution.store(ticket.generation(), Ordering::Release);
        ticket
    }

    fn handle_internal(&mut self, internal: Internal) {
        match internal {
            Internal::DismissElapsed {
                facility_id,
                generation,
            } => {
                if self.dismiss_generations.get(&facility_id) != Some(&generation) {
                    tracing::trace!(facility = %facility_id, generation, "stale popup dismiss");
                    return;
                }
                self.dismiss_generations.remove(&facility_id);
                self.marker_input(&facility_id, MarkerInput::DismissElapsed);
            }
            Internal::Resolved { ticket, result } => self.on_resolved(ticket, result),
            Internal::IntentRedeemed {
                ticket,
                intent,
                result,
            } => {
                if !self.session.is_current(ticket) {
                    tracing::debug!("pending intent superseded by a newer search");
                    return;
                }
                if let LocateIntent::Address { address } = &intent {
                    self.surface.set_address_input(address);
                }
                self.on_resolved(ticket, result);
            }
            Internal::IntentAbsent => {}
            Internal::Ranked { ticket, facilities } => {
                if self.session.is_current(ticket) {
                    self.reorder.request(Internal::ReorderSettled { ticket, facilities });
                }
            }
            Internal::ReorderSettled { ticket, facilities } => {
                if self.session.apply_ranking(ticket, facilities) {
                    self.surface.render_list(self.session.facilities());
                }
            }
            Internal::RouteComputed {
                ticket,
                facility_id,
                result,
            } => self.on_route(ticket, &facility_id, result),
        }
    }

    fn on_resolved(&mut self, ticket: ResolutionTicket, result: Result<Coordinate, LocateError>) {
        if !self.session.is_current(ticket) {
            tracing::debug!(ticket = ticket.generation(), "dropping superseded location result");
            return;
        }

        let coordinate = match result {
            Ok(coordinate) => coordinate,
            Err(e) => {
                self.fail(&e);
                return;
            }
        };
        if !self.session.apply_user_coordinate(ticket, coordinate) {
            return;
        }
        tracing::info!(%coordinate, "user located");

        if self.user_marker_placed {
            self.surface.remove_user_marker();
        }
        self.surface.place_user_marker(coordinate);
        self.user_marker_placed = true;
        self.surface.focus(coordinate);

        // A route drawn from the previous position no longer applies.
        self.session.begin_route();
        if self.session.clear_route() {
            self.surface.clear_route();
        }

        self.surface.render_list(self.session.facilities());

        let facilities = self.session.facilities().to_vec();
        let sorter = Arc::clone(&self.sorter);
        self.tasks.spawn(async move {
            let facilities = sorter.rank_by_distance(coordinate, facilities).await;
            Internal::Ranked { ticket, facilities }
        });
    }

    fn on_route(
        &mut self,
        ticket: ResolutionTicket,
        facility_id: &str,
        result: Result<RouteResult, LocateError>,
    ) {
        if !self.session.is_current_route(ticket) {
            tracing::debug!(facility = facility_id, "dropping superseded route");
            return;
        }
        let route = match result {
            Ok(route) => route,
            Err(e) => {
                self.fail(&e);
                return;
            }
        };
        let Some(facility) = self.session.facility(facility_id).cloned() else {
            return;
        };

        self.surface.clear_route();
        self.surface.draw_route(&facility, &route);
        tracing::info!(
            facility = facility_id,
            km = route.distance_km(),
            minutes = route.duration_min(),
            "route drawn"
        );
        self.session.apply_route(ticket, facility_id, route);
    }

    fn marker_input(&mut self, id: &str, input: MarkerInput) {
        let effects = self.session.markers_mut().apply(id, input);
        self.apply_effects(effects);
    }

    fn apply_effects(&mut self, effects: Vec<MarkerEffect>) {
        for effect in effects {
            match effect {
                MarkerEffect::ShowPopup(id) => {
                    if let Some(facility) = self.session.facility(&id) {
                        self.surface.show_popup(facility);
                    }
                }
                MarkerEffect::HidePopup(id) => self.surface.hide_popup(&id),
                MarkerEffect::ScheduleDismiss(id) => {
                    self.next_dismiss += 1;
                    self.dismiss_generations.insert(id.clone(), self.next_dismiss);
                    let sink = self.internal_tx.clone();
                    let event = Internal::DismissElapsed {
                        facility_id: id.clone(),
                        generation: self.next_dismiss,
                    };
                    self.dismiss_timers
                        .schedule(id, self.timings.popup_dismiss, async move {
                            let _ = sink.send(event);
                        });
                }
                MarkerEffect::CancelDismiss(id) => {
                    self.dismiss_generations.remove(&id);
                    self.dismiss_timers.cancel(&id);
                }
                MarkerEffect::Highlight(id) => self.surface.set_highlight(&id, true),
                MarkerEffect::ClearHighlight(id) => self.surface.set_highlight(&id, false),
            }
        }
    }

    fn fail(&mut self, error: &LocateError) {
        tracing::warn!(error = %error, "locate action failed");
        self.surface.alert(error.user_message());
    }

    fn shutdown(&mut self) {
        tracing::debug!(in_flight = self.tasks.len(), "map page unloading");
        self.tasks.abort_all();
        self.dismiss_timers.cancel_all();
        self.dismiss_generations.clear();
        self.reorder.cancel();
        for listener in self.listeners.drain(..) {
            listener.abort();
        }
    }
}

impl<G, P, R> Drop for MapPresenter<G, P, R> {
    fn drop(&mut self) {
        for listener in &self.listeners {
            listener.abort();
        }
    }
}
