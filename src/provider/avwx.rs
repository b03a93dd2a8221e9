//! AVWX REST API client
//!
//! Fetches the current METAR for a station from `{base_url}/metar/{ICAO}` and
//! normalizes the JSON into an [`Observation`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::ObservationProvider;
use crate::config::ProviderConfig;
use crate::error::{FetchError, VaayuError};
use crate::models::{
    CloudCoverage, CloudLayer, DistanceUnit, FlightRules, Measurement, Observation,
    ObservationTime, PressureUnit, SpeedUnit, StationId, TemperatureUnit,
};

/// AVWX API client
pub struct AvwxClient {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    base_url: String,
}

impl AvwxClient {
    /// Create a new client with timeout and transient-failure retries
    pub fn new(config: &ProviderConfig) -> Result<Self, VaayuError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("Vaayu/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VaayuError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        if config.api_key.is_none() {
            warn!("No AVWX API key configured, requests will likely be rejected");
        }

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn metar_url(&self, station: &StationId) -> String {
        format!(
            "{}/metar/{}",
            self.base_url,
            urlencoding::encode(station.as_str())
        )
    }
}

#[async_trait]
impl ObservationProvider for AvwxClient {
    #[instrument(name = "avwx_fetch", skip(self), fields(station = %station))]
    async fn fetch_observation(&self, station: &StationId) -> Result<Observation, FetchError> {
        let url = self.metar_url(station);
        debug!("AVWX request URL: {}", url);
        let start_time = Instant::now();

        let mut request = self.client.get(&url);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::UpstreamUnavailable(format!("AVWX request failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            let error_text = response.text().await.unwrap_or_default();
            let err = error_for_status(status, retry_after, station, &error_text);
            warn!("AVWX returned {}: {}", status, err);
            return Err(err);
        }

        let body = response.text().await.map_err(|e| {
            FetchError::UpstreamUnavailable(format!("Failed to read AVWX response: {e}"))
        })?;

        let metar: AvwxMetar = serde_json::from_str(&body).map_err(|e| {
            FetchError::MalformedUpstreamResponse(format!("Failed to parse AVWX response: {e}"))
        })?;
        let observation = metar.into_observation(station)?;

        info!(
            "Retrieved METAR for {} in {:.3}s",
            observation.station,
            start_time.elapsed().as_secs_f64()
        );
        Ok(observation)
    }
}

/// Map a non-200 AVWX status to a typed failure
fn error_for_status(
    status: StatusCode,
    retry_after: Option<u64>,
    station: &StationId,
    body: &str,
) -> FetchError {
    match status.as_u16() {
        // 204: station exists but has no current report
        204 | 400 | 404 => FetchError::StationNotFound(station.to_string()),
        429 => FetchError::UpstreamRateLimited {
            retry_after_secs: retry_after,
        },
        401 | 403 => FetchError::UpstreamUnavailable(format!(
            "AVWX rejected the API key (HTTP {})",
            status.as_u16()
        )),
        _ => FetchError::UpstreamUnavailable(format!(
            "AVWX error {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        )),
    }
}

/// METAR layer heights are three digits, in hundreds of feet
const MAX_CLOUD_ALTITUDE: u32 = 999;

/// A `{ repr, value }` pair as AVWX reports numbers
#[derive(Debug, Clone, Deserialize)]
pub struct AvwxNumber {
    pub repr: Option<String>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvwxTime {
    pub repr: String,
    pub dt: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvwxCloud {
    #[serde(rename = "type")]
    pub cloud_type: String,
    /// Hundreds of feet
    pub altitude: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvwxUnits {
    pub altimeter: String,
    pub temperature: String,
    pub visibility: String,
    pub wind_speed: String,
}

/// METAR response body from AVWX
#[derive(Debug, Clone, Deserialize)]
pub struct AvwxMetar {
    pub station: String,
    pub raw: String,
    pub time: Option<AvwxTime>,
    pub flight_rules: Option<String>,
    pub altimeter: Option<AvwxNumber>,
    pub visibility: Option<AvwxNumber>,
    pub wind_direction: Option<AvwxNumber>,
    pub wind_speed: Option<AvwxNumber>,
    pub wind_gust: Option<AvwxNumber>,
    pub temperature: Option<AvwxNumber>,
    pub dewpoint: Option<AvwxNumber>,
    /// Fraction in `[0, 1]`
    pub relative_humidity: Option<f64>,
    #[serde(default)]
    pub clouds: Vec<AvwxCloud>,
    pub units: AvwxUnits,
}

impl AvwxMetar {
    /// Normalize into an [`Observation`].
    ///
    /// `requested` is used when AVWX echoes a station code we cannot parse.
    pub fn into_observation(self, requested: &StationId) -> Result<Observation, FetchError> {
        let station = StationId::parse(&self.station).unwrap_or_else(|_| requested.clone());

        let time = self.time.ok_or_else(|| malformed("missing report time"))?;
        let dt = time.dt.ok_or_else(|| malformed("missing report timestamp"))?;

        let altimeter_unit: PressureUnit = self.units.altimeter.parse().map_err(malformed)?;
        let temperature_unit: TemperatureUnit =
            self.units.temperature.parse().map_err(malformed)?;
        let visibility_unit: DistanceUnit = self.units.visibility.parse().map_err(malformed)?;
        let speed_unit: SpeedUnit = self.units.wind_speed.parse().map_err(malformed)?;

        let altimeter = required("altimeter", self.altimeter)?;
        let visibility = required("visibility", self.visibility)?;
        let wind_speed = required("wind_speed", self.wind_speed)?;

        let wind_direction = match value_of(self.wind_direction) {
            Some(degrees) if (0.0..=360.0).contains(&degrees) => Some(degrees.round() as u16),
            Some(degrees) => return Err(malformed(format!("wind direction {degrees} out of range"))),
            None => None,
        };

        let mut clouds = Vec::with_capacity(self.clouds.len());
        for cloud in self.clouds {
            let coverage: CloudCoverage = cloud.cloud_type.parse().map_err(malformed)?;
            match cloud.altitude {
                Some(altitude) if altitude > MAX_CLOUD_ALTITUDE => {
                    return Err(malformed(format!(
                        "{} layer altitude {altitude} out of range",
                        coverage.code()
                    )));
                }
                Some(altitude) => clouds.push(CloudLayer::new(coverage, altitude)),
                None => warn!(
                    "Skipping {} layer without altitude at {}",
                    coverage.code(),
                    station
                ),
            }
        }

        let reported_flight_rules = self
            .flight_rules
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| match s.parse::<FlightRules>() {
                Ok(rules) => Some(rules),
                Err(e) => {
                    warn!("Ignoring upstream flight rules: {}", e);
                    None
                }
            });

        Ok(Observation {
            station,
            observed_at: ObservationTime { repr: time.repr, dt },
            temperature: value_of(self.temperature).map(|v| Measurement::new(v, temperature_unit)),
            dewpoint: value_of(self.dewpoint).map(|v| Measurement::new(v, temperature_unit)),
            relative_humidity: self.relative_humidity.map(humidity_percent),
            altimeter: Measurement::new(altimeter, altimeter_unit),
            visibility: Measurement::new(visibility, visibility_unit),
            wind_direction,
            wind_speed: Measurement::new(wind_speed, speed_unit),
            wind_gust: value_of(self.wind_gust).map(|v| Measurement::new(v, speed_unit)),
            clouds,
            reported_flight_rules,
            raw: self.raw,
        })
    }
}

/// AVWX reports a fraction; anything above 1 is taken as already in percent
fn humidity_percent(value: f64) -> f64 {
    if value <= 1.0 { value * 100.0 } else { value }
}

fn value_of(number: Option<AvwxNumber>) -> Option<f64> {
    number.and_then(|n| n.value)
}

fn required(field: &str, number: Option<AvwxNumber>) -> Result<f64, FetchError> {
    value_of(number).ok_or_else(|| malformed(format!("missing {field}")))
}

fn malformed(message: impl Into<String>) -> FetchError {
    FetchError::MalformedUpstreamResponse(message.into())
}
