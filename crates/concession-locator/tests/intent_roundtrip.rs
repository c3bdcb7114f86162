//! Cross-page hand-off against a mocked Mapbox geocoding endpoint. An
//! address intent written on one page and redeemed on the map page lands on
//! the same coordinate as geocoding the address directly.

use std::sync::Arc;

use concession_core::Coordinate;
use concession_locator::{
    CtaOutcome, DeniedPosition, FileStorage, IntentStore, LocateCta, LocateIntent,
    LocationResolver, PageReady,
};
use concession_mapbox::{GeocodingClient, MapboxClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mapbox_with_lyon() -> (MockServer, GeocodingClient) {
    let server = MockServer::start().await;
    let body = json!({
        "type": "FeatureCollection",
        "features": [{
            "id": "address.42",
            "type": "Feature",
            "text": "Gerland",
            "place_name": "Gerland, 69007 Lyon, France",
            "center": [4.8421, 45.7512]
        }]
    });
    Mock::given(method("GET"))
        .and(path("/geocoding/v5/mapbox.places/Gerland.json"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = MapboxClient::with_base_url("pk.test", 5, "concession-test/0.1", &server.uri())
        .expect("client construction should not fail");
    (server, GeocodingClient::new(client, "fr", "fr"))
}

#[tokio::test]
async fn redeemed_address_intent_matches_direct_geocode() {
    let (_server, geocoder) = mapbox_with_lyon().await;
    let state_dir = tempfile::tempdir().unwrap();
    let address = "Gerland";

    // Home page: the call-to-action stores the intent.
    let cta = LocateCta::new(
        IntentStore::new(Arc::new(FileStorage::new(state_dir.path()))),
        "/concessions",
    );
    assert_eq!(
        cta.submit_address(address).unwrap(),
        CtaOutcome::Navigate("/concessions".to_owned())
    );

    // Map page: a fresh store over the same state directory.
    let store = IntentStore::new(Arc::new(FileStorage::new(state_dir.path())));
    let direct = geocoder.geocode(address).await.unwrap();
    let resolver = LocationResolver::new(geocoder, DeniedPosition);

    let (intent, result) = resolver
        .consume_pending_intent(&store, &PageReady::already_ready())
        .await
        .expect("intent pending");

    assert_eq!(
        intent,
        LocateIntent::Address {
            address: address.to_owned()
        }
    );
    let redeemed = result.unwrap();
    assert_eq!(redeemed, direct);
    assert_eq!(redeemed, Coordinate::new(4.8421, 45.7512));
    assert!(store.take().is_none());
}

#[tokio::test]
async fn geolocate_intent_without_position_source_reports_denied() {
    let (_server, geocoder) = mapbox_with_lyon().await;
    let state_dir = tempfile::tempdir().unwrap();
    let store = IntentStore::new(Arc::new(FileStorage::new(state_dir.path())));
    LocateCta::new(store.clone(), "/concessions")
        .request_geolocation()
        .unwrap();

    let resolver = LocationResolver::new(geocoder, DeniedPosition);
    let (intent, result) = resolver
        .consume_pending_intent(&store, &PageReady::already_ready())
        .await
        .expect("intent pending");

    assert_eq!(intent, LocateIntent::Geolocate);
    assert!(result.unwrap_err().user_message().contains("position"));
}
