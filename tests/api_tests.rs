//! HTTP API tests driven through the full router with a scripted provider

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use vaayu::{
    AppState, FetchError, Observation, ObservationProvider, StationHistory, StationId,
    config::ServerConfig, provider::AvwxMetar, web,
};

/// Serves the recorded AVWX fixtures and scripted failures for a few codes
struct FixtureProvider;

#[async_trait]
impl ObservationProvider for FixtureProvider {
    async fn fetch_observation(&self, station: &StationId) -> Result<Observation, FetchError> {
        let json = match station.as_str() {
            "KJFK" => include_str!("fixtures/avwx_kjfk.json"),
            "EGLL" => include_str!("fixtures/avwx_egll.json"),
            "RATE" => {
                return Err(FetchError::UpstreamRateLimited {
                    retry_after_secs: Some(30),
                });
            }
            "DOWN" => return Err(FetchError::UpstreamUnavailable("HTTP 503".into())),
            "KBAD" => {
                return Err(FetchError::MalformedUpstreamResponse(
                    "missing field `visibility`".into(),
                ));
            }
            other => return Err(FetchError::StationNotFound(other.to_string())),
        };
        let metar: AvwxMetar = serde_json::from_str(json)
            .map_err(|e| FetchError::MalformedUpstreamResponse(e.to_string()))?;
        metar.into_observation(station)
    }
}

fn ids(codes: &[&str]) -> Vec<StationId> {
    codes.iter().map(|c| StationId::parse(c).unwrap()).collect()
}

fn test_app() -> axum::Router {
    let history = StationHistory::new(8, ids(&["KJFK", "VABB"]));
    let state = AppState::new(Arc::new(FixtureProvider), history);
    web::app(&ServerConfig::default(), state)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

#[tokio::test]
async fn test_metar_report_for_imperial_station() {
    let (status, _, body) = get(test_app(), "/api/metar/kjfk").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["station"], "KJFK");
    assert_eq!(body["reported_flight_rules"], "MVFR");
    assert_eq!(body["metrics"]["flight_rules"], "MVFR");
    assert_eq!(body["metrics"]["visibility_category"], "VFR");
    assert_eq!(body["metrics"]["ceiling_category"], "MVFR");
    assert_eq!(body["metrics"]["ceiling_altitude_feet"], 2500);
    assert_eq!(body["metrics"]["wind_cardinal"], "SW");
    assert_eq!(body["metrics"]["relative_humidity"], 53);
    assert_eq!(body["metrics"]["safety"]["wind_gust"], "unsafe");
    assert_eq!(body["metrics"]["safety"]["altimeter"], "safe");
    assert!(body["metrics_error"].is_null());
}

#[tokio::test]
async fn test_metar_report_for_metric_station() {
    let (status, _, body) = get(test_app(), "/api/metar/EGLL").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"]["flight_rules"], "VFR");
    assert_eq!(body["metrics"]["ceiling"]["kind"], "unlimited");
    assert_eq!(body["metrics"]["ceiling_altitude_feet"], 10_000);
    // Q1005 is just under 29.70 inHg
    assert_eq!(body["metrics"]["safety"]["altimeter"], "unsafe");
    assert_eq!(body["metrics"]["safety"]["wind_gust"], "safe");
    assert!(body["metrics"]["wind_cardinal"].is_null());
}

#[tokio::test]
async fn test_invalid_station_code_is_rejected() {
    for uri in ["/api/metar/K1", "/api/metar/KJFKX", "/api/metar/K-FK"] {
        let (status, _, body) = get(test_app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "invalid_input");
    }
}

#[tokio::test]
async fn test_unknown_station_is_not_found() {
    let (status, _, body) = get(test_app(), "/api/metar/ZZZZ").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "station_not_found");
    assert!(body["error"].as_str().unwrap().contains("ZZZZ"));
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let (status, headers, body) = get(test_app(), "/api/metar/RATE").await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(headers[header::RETRY_AFTER], "30");
    assert_eq!(body["code"], "upstream_rate_limited");
}

#[tokio::test]
async fn test_upstream_failures_are_bad_gateway() {
    let (status, _, body) = get(test_app(), "/api/metar/DOWN").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "upstream_unavailable");

    let (status, _, body) = get(test_app(), "/api/metar/KBAD").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "malformed_upstream_response");
}

#[tokio::test]
async fn test_history_records_successful_lookups_only() {
    let app = test_app();

    let (_, _, body) = get(app.clone(), "/api/history").await;
    assert_eq!(body, serde_json::json!(["KJFK", "VABB"]));

    let (status, _, _) = get(app.clone(), "/api/metar/egll").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = get(app.clone(), "/api/metar/ZZZZ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = get(app.clone(), "/api/metar/KJFK").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = get(app, "/api/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!(["EGLL", "KJFK", "VABB"]));
}

#[tokio::test]
async fn test_health() {
    let (status, _, body) = get(test_app(), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], vaayu::VERSION);
}
