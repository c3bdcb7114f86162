//! Integration tests for `RoutingClient` using wiremock HTTP mocks.

use concession_core::Coordinate;
use concession_mapbox::{MapboxClient, MapboxError, RoutingClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> RoutingClient {
    let mapbox = MapboxClient::with_base_url("pk.test", 5, "concession-test/0.1", base_url)
        .expect("client construction should not fail");
    RoutingClient::new(mapbox)
}

const LYON: Coordinate = Coordinate::new(4.8357, 45.764);
const VILLEURBANNE: Coordinate = Coordinate::new(4.88, 45.7667);

#[tokio::test]
async fn route_returns_first_route() {
    let server = MockServer::start().await;

    let body = json!({
        "code": "Ok",
        "routes": [
            {
                "distance": 5234.7,
                "duration": 742.1,
                "weight": 800.0,
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[4.8357, 45.764], [4.86, 45.765], [4.88, 45.7667]]
                }
            },
            {
                "distance": 9999.0,
                "duration": 9999.0,
                "geometry": { "type": "LineString", "coordinates": [] }
            }
        ],
        "waypoints": []
    });

    Mock::given(method("GET"))
        .and(path("/directions/v5/mapbox/driving/4.8357,45.764;4.88,45.7667"))
        .and(query_param("geometries", "geojson"))
        .and(query_param("overview", "full"))
        .and(query_param("access_token", "pk.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let route = client.route(LYON, VILLEURBANNE).await.expect("should route");

    assert!((route.distance_meters - 5234.7).abs() < 1e-9);
    assert!((route.duration_seconds - 742.1).abs() < 1e-9);
    assert!((route.distance_km() - 5.2347).abs() < 1e-9);
    assert_eq!(route.path.len(), 3);
    assert_eq!(route.path[0], LYON);
    assert_eq!(route.path[2], VILLEURBANNE);
}

#[tokio::test]
async fn route_with_zero_routes_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "code": "NoRoute", "routes": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.route(LYON, VILLEURBANNE).await.unwrap_err();
    assert!(
        matches!(err, MapboxError::RouteUnavailable { ref reason } if reason == "NoRoute"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn route_non_success_status_is_unavailable_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(422).set_body_json(&json!({
            "code": "InvalidInput",
            "message": "Coordinate is invalid: 200,45"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.route(LYON, VILLEURBANNE).await.unwrap_err();
    assert!(
        matches!(err, MapboxError::RouteUnavailable { ref reason } if reason.contains("Coordinate is invalid")),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn route_server_error_without_body_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.route(LYON, VILLEURBANNE).await.unwrap_err();
    assert!(
        matches!(err, MapboxError::RouteUnavailable { ref reason } if reason == "HTTP 500"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn route_connection_failure_is_http_error() {
    // Nothing listens on port 1.
    let client = test_client("http://127.0.0.1:1");
    let err = client.route(LYON, VILLEURBANNE).await.unwrap_err();
    assert!(matches!(err, MapboxError::Http(_)), "got: {err:?}");
    assert!(err.is_transport());
}
