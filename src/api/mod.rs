use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    error::{FetchError, VaayuError},
    history::StationHistory,
    models::StationId,
    provider::ObservationProvider,
    report::MetarReport,
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ObservationProvider>,
    pub history: Arc<RwLock<StationHistory>>,
}

impl AppState {
    pub fn new(provider: Arc<dyn ObservationProvider>, history: StationHistory) -> Self {
        Self {
            provider,
            history: Arc::new(RwLock::new(history)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metar/{icao}", get(get_metar))
        .route("/history", get(get_history))
        .route("/health", get(health))
        .with_state(state)
}

/// Error response: `{ "error": <message>, "code": <kind> }`
pub struct ApiError(VaayuError);

impl<E: Into<VaayuError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            VaayuError::Validation { .. } => StatusCode::BAD_REQUEST,
            VaayuError::Fetch(FetchError::StationNotFound(_)) => StatusCode::NOT_FOUND,
            VaayuError::Fetch(FetchError::UpstreamRateLimited { .. }) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            VaayuError::Fetch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.0.user_message(),
            "code": self.0.code(),
        }));
        let mut response = (status, body).into_response();

        if let VaayuError::Fetch(FetchError::UpstreamRateLimited {
            retry_after_secs: Some(secs),
        }) = &self.0
        {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

async fn get_metar(
    State(state): State<AppState>,
    Path(icao): Path<String>,
) -> Result<Json<MetarReport>, ApiError> {
    let station = StationId::parse(&icao)?;

    let observation = state.provider.fetch_observation(&station).await.map_err(|e| {
        warn!(station = %station, "METAR fetch failed: {e}");
        e
    })?;

    if state.history.write().await.record(&station) {
        info!(station = %station, "Added station to history");
    }

    Ok(Json(MetarReport::build(observation)))
}

async fn get_history(State(state): State<AppState>) -> Json<Vec<StationId>> {
    Json(state.history.read().await.stations())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}
