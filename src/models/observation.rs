//! Normalized METAR observation as handed over by the ingestion layer

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::units::{DistanceUnit, PressureUnit, SpeedUnit, TemperatureUnit};
use super::FlightRules;
use crate::error::VaayuError;

/// Airport identifier, always uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    /// Parse a user supplied airport code.
    ///
    /// Surrounding whitespace is ignored and the code is uppercased. Accepts
    /// 3 or 4 ASCII alphanumerics (ICAO codes, plus the short codes AVWX resolves).
    pub fn parse(input: &str) -> Result<Self, VaayuError> {
        let code = input.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(VaayuError::validation("Airport code cannot be empty"));
        }
        if !(3..=4).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(VaayuError::validation(format!(
                "'{}' is not a valid airport code (expected 3-4 letters or digits)",
                input.trim()
            )));
        }
        Ok(Self(code))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StationId {
    type Err = VaayuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StationId {
    type Error = VaayuError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StationId> for String {
    fn from(value: StationId) -> Self {
        value.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A numeric reading together with the unit it was reported in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement<U> {
    pub value: f64,
    pub unit: U,
}

impl<U> Measurement<U> {
    pub fn new(value: f64, unit: U) -> Self {
        Self { value, unit }
    }
}

/// Report time, both as printed in the report and as a timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationTime {
    /// Human-readable form, e.g. `121851Z`
    pub repr: String,
    pub dt: DateTime<Utc>,
}

/// Cloud coverage of a single layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloudCoverage {
    /// Few, 1-2 oktas
    #[serde(rename = "FEW")]
    Few,
    /// Scattered, 3-4 oktas
    #[serde(rename = "SCT")]
    Scattered,
    /// Broken, 5-7 oktas
    #[serde(rename = "BKN")]
    Broken,
    /// Overcast, 8 oktas
    #[serde(rename = "OVC")]
    Overcast,
    /// Vertical visibility into an obscuration (fog, heavy precipitation)
    #[serde(rename = "VV")]
    VerticalVisibility,
}

impl CloudCoverage {
    /// Whether a layer of this coverage constitutes a ceiling
    #[must_use]
    pub fn forms_ceiling(self) -> bool {
        matches!(
            self,
            CloudCoverage::Broken | CloudCoverage::Overcast | CloudCoverage::VerticalVisibility
        )
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            CloudCoverage::Few => "FEW",
            CloudCoverage::Scattered => "SCT",
            CloudCoverage::Broken => "BKN",
            CloudCoverage::Overcast => "OVC",
            CloudCoverage::VerticalVisibility => "VV",
        }
    }
}

impl FromStr for CloudCoverage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FEW" => Ok(CloudCoverage::Few),
            "SCT" => Ok(CloudCoverage::Scattered),
            "BKN" => Ok(CloudCoverage::Broken),
            "OVC" => Ok(CloudCoverage::Overcast),
            "VV" => Ok(CloudCoverage::VerticalVisibility),
            other => Err(format!("unknown cloud coverage '{other}'")),
        }
    }
}

/// One reported cloud layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudLayer {
    pub coverage: CloudCoverage,
    /// Base altitude in hundreds of feet
    pub altitude: u32,
}

impl CloudLayer {
    #[must_use]
    pub fn new(coverage: CloudCoverage, altitude: u32) -> Self {
        Self { coverage, altitude }
    }

    /// Base altitude in feet, `None` if it does not fit in a `u32`
    #[must_use]
    pub fn altitude_feet(&self) -> Option<u32> {
        self.altitude.checked_mul(100)
    }
}

/// Normalized weather observation for one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station: StationId,
    pub observed_at: ObservationTime,
    pub temperature: Option<Measurement<TemperatureUnit>>,
    pub dewpoint: Option<Measurement<TemperatureUnit>>,
    /// Relative humidity in percent, when the provider supplies it
    pub relative_humidity: Option<f64>,
    pub altimeter: Measurement<PressureUnit>,
    pub visibility: Measurement<DistanceUnit>,
    /// Degrees as reported; `None` for variable wind
    pub wind_direction: Option<u16>,
    pub wind_speed: Measurement<SpeedUnit>,
    pub wind_gust: Option<Measurement<SpeedUnit>>,
    pub clouds: Vec<CloudLayer>,
    /// Category computed by the provider, kept verbatim
    pub reported_flight_rules: Option<FlightRules>,
    /// Unmodified report text
    pub raw: String,
}
