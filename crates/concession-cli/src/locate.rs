//! Locator command handlers: `suggest`, `geocode`, `route` and `map`.

use std::sync::Arc;
use std::time::Duration;

use concession_core::{load_facilities, AppConfig, Coordinate};
use concession_locator::{
    DeniedPosition, DistanceSorter, FacilityRecord, FileStorage, FixedPosition, GeolocationError,
    IntentStore, LocationResolver, MapEvent, MapPresenter, PageReady, PositionOptions,
    PositionProvider, PresenterTimings, SuggestionDebouncer, Suggestions, DEFAULT_SUGGEST_DELAY,
};
use concession_mapbox::{GeocodingClient, MapboxClient, RoutingClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::surface::TerminalSurface;

/// How `map` obtains the user's position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MapStart {
    Address(String),
    Geolocate,
    /// Redeem whatever a call-to-action stored before.
    PendingIntent,
}

/// The desktop position source: a configured fix, or refusal.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ConfiguredPosition {
    Fixed(FixedPosition),
    Denied(DeniedPosition),
}

impl From<Option<Coordinate>> for ConfiguredPosition {
    fn from(position: Option<Coordinate>) -> Self {
        match position {
            Some(at) => Self::Fixed(FixedPosition(at)),
            None => Self::Denied(DeniedPosition),
        }
    }
}

impl PositionProvider for ConfiguredPosition {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinate, GeolocationError> {
        match self {
            Self::Fixed(fixed) => fixed.current_position(options).await,
            Self::Denied(denied) => denied.current_position(options).await,
        }
    }
}

fn mapbox_client(config: &AppConfig) -> anyhow::Result<MapboxClient> {
    MapboxClient::with_base_url(
        &config.mapbox_access_token,
        config.request_timeout_secs,
        &config.user_agent,
        &config.mapbox_base_url,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Mapbox client: {e}"))
}

fn geocoding_client(config: &AppConfig, client: MapboxClient) -> GeocodingClient {
    GeocodingClient::new(client, &config.geocode_country, &config.geocode_language)
}

/// The durable intent store under the configured state directory.
pub(crate) fn intent_store(config: &AppConfig) -> IntentStore {
    IntentStore::new(Arc::new(FileStorage::new(&config.state_dir)))
        .with_max_age(Duration::from_secs(config.intent_max_age_secs))
}

pub(crate) fn print_suggestions(suggestions: &Suggestions) {
    if suggestions.items.is_empty() {
        println!("Aucune suggestion pour \"{}\".", suggestions.query);
        return;
    }
    for suggestion in &suggestions.items {
        println!(
            "{:<24} {}  ({})",
            suggestion.short_label, suggestion.display_name, suggestion.coordinate
        );
    }
}

/// One-shot when `query` is given. Otherwise each stdin line is an input
/// change and suggestions print once typing settles.
pub(crate) async fn run_suggest(config: &AppConfig, query: Option<&str>) -> anyhow::Result<()> {
    let geocoder = Arc::new(geocoding_client(config, mapbox_client(config)?));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let debouncer = SuggestionDebouncer::new(geocoder, DEFAULT_SUGGEST_DELAY, tx);

    if let Some(query) = query {
        debouncer.input(query);
        if let Some(suggestions) = rx.recv().await {
            print_suggestions(&suggestions);
        }
        return Ok(());
    }

    println!("Tapez une adresse ou un code postal (Ctrl-D pour quitter).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => debouncer.input(&line),
                None => break,
            },
            Some(suggestions) = rx.recv() => print_suggestions(&suggestions),
        }
    }
    debouncer.clear();
    Ok(())
}

pub(crate) async fn run_geocode(config: &AppConfig, address: &str) -> anyhow::Result<()> {
    let geocoder = geocoding_client(config, mapbox_client(config)?);
    let coordinate = geocoder.geocode(address).await?;
    println!("{coordinate}");
    Ok(())
}

pub(crate) async fn run_route(
    config: &AppConfig,
    from: Coordinate,
    to: Coordinate,
) -> anyhow::Result<()> {
    let router = RoutingClient::new(mapbox_client(config)?);
    let route = router.route(from, to).await?;
    println!(
        "{:.1} km, {:.0} min, {} points",
        route.distance_km(),
        route.duration_min(),
        route.path.len()
    );
    Ok(())
}

/// Mounts the presenter on a terminal surface, locates the user and prints
/// the ranked dealerships.
///
/// # Errors
///
/// Returns an error if the facilities file cannot be loaded or the Mapbox
/// client cannot be built. Locate failures are shown as alerts, not errors.
pub(crate) async fn run_map(
    config: &AppConfig,
    start: MapStart,
    position: Option<Coordinate>,
    directions: Option<&str>,
) -> anyhow::Result<()> {
    let file = load_facilities(&config.facilities_path)?;
    let records: Vec<FacilityRecord> = file.facilities.iter().map(FacilityRecord::from).collect();

    let client = mapbox_client(config)?;
    let resolver = Arc::new(LocationResolver::new(
        geocoding_client(config, client.clone()),
        ConfiguredPosition::from(position),
    ));
    let sorter = Arc::new(DistanceSorter::with_pacing(
        RoutingClient::new(client),
        Duration::from_millis(config.route_pacing_ms),
    ));
    let timings = PresenterTimings {
        reorder: Duration::from_millis(config.sort_debounce_ms),
        ..PresenterTimings::default()
    };

    // An empty facilities file means there is no map to show.
    let facilities = (!records.is_empty()).then_some(records);
    let Some(mut presenter) = MapPresenter::mount(
        Box::new(TerminalSurface::default()),
        facilities,
        resolver,
        sorter,
        timings,
    ) else {
        println!("Aucune concession configurée.");
        return Ok(());
    };

    match start {
        MapStart::Address(address) => {
            presenter.handle(MapEvent::SearchAddress(address));
        }
        MapStart::Geolocate => {
            presenter.handle(MapEvent::Geolocate);
        }
        MapStart::PendingIntent => {
            presenter.redeem_pending_intent(intent_store(config), PageReady::already_ready());
        }
    }
    presenter.run_until_idle().await;

    if presenter.session().user_coordinate().is_none() {
        println!("Position inconnue: utilisez --address, --geolocate ou `concession cta`.");
        return Ok(());
    }

    if let Some(facility_id) = directions {
        presenter.handle(MapEvent::ShowDirections(facility_id.to_owned()));
        presenter.run_until_idle().await;
    }

    presenter.handle(MapEvent::Unload);
    Ok(())
}
