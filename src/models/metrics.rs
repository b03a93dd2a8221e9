//! Derived metrics model: flight-rule categories, ceiling, gauges and safety flags

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Altitude reported for "no ceiling".
///
/// Sits above every ceiling threshold so an unlimited ceiling always classifies
/// as VFR, and equals the ceiling gauge maximum so it renders as a full gauge.
pub const CEILING_UNLIMITED_FT: u32 = 10_000;

/// Upper end of the visibility gauge, in statute miles
pub const VISIBILITY_GAUGE_MAX_SM: f64 = 10.0;

/// Upper end of the ceiling gauge, in feet
pub const CEILING_GAUGE_MAX_FT: f64 = CEILING_UNLIMITED_FT as f64;

/// Flight rules category.
///
/// Variants are declared from least to most restrictive, so `Ord` compares by
/// severity: `Vfr < Mvfr < Ifr < Lifr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightRules {
    /// Visual flight rules
    Vfr,
    /// Marginal visual flight rules
    Mvfr,
    /// Instrument flight rules
    Ifr,
    /// Low instrument flight rules
    Lifr,
}

impl FlightRules {
    /// The more restrictive of two categories
    #[must_use]
    pub fn worst_of(self, other: FlightRules) -> FlightRules {
        self.max(other)
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            FlightRules::Vfr => "VFR",
            FlightRules::Mvfr => "MVFR",
            FlightRules::Ifr => "IFR",
            FlightRules::Lifr => "LIFR",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            FlightRules::Vfr => "Visual Flight Rules",
            FlightRules::Mvfr => "Marginal Visual Flight Rules",
            FlightRules::Ifr => "Instrument Flight Rules",
            FlightRules::Lifr => "Low Instrument Flight Rules",
        }
    }
}

impl fmt::Display for FlightRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FlightRules {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VFR" => Ok(FlightRules::Vfr),
            "MVFR" => Ok(FlightRules::Mvfr),
            "IFR" => Ok(FlightRules::Ifr),
            "LIFR" => Ok(FlightRules::Lifr),
            other => Err(format!("unknown flight rules '{other}'")),
        }
    }
}

/// Highlighting state of a single dashboard field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyStatus {
    Safe,
    Unsafe,
    /// Shown without highlighting
    Neutral,
}

/// Lowest obscuring layer, or none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ceiling {
    Limited { feet: u32 },
    Unlimited,
}

impl Ceiling {
    /// Altitude in feet; [`CEILING_UNLIMITED_FT`] when there is no ceiling
    #[must_use]
    pub fn altitude_feet(self) -> u32 {
        match self {
            Ceiling::Limited { feet } => feet,
            Ceiling::Unlimited => CEILING_UNLIMITED_FT,
        }
    }

    #[must_use]
    pub fn is_unlimited(self) -> bool {
        matches!(self, Ceiling::Unlimited)
    }
}

/// Fill level of a donut gauge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub value: f64,
    pub max: f64,
    /// `min(value, max) / max`, always within `[0, 1]`
    pub ratio: f64,
}

impl Gauge {
    #[must_use]
    pub fn new(value: f64, max: f64) -> Self {
        let ratio = if max > 0.0 {
            (value.min(max) / max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { value, max, ratio }
    }
}

/// Per-field highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyFlags {
    pub altimeter: SafetyStatus,
    pub wind_gust: SafetyStatus,
    pub temperature: SafetyStatus,
    pub dewpoint: SafetyStatus,
    pub humidity: SafetyStatus,
}

/// Everything the dashboard derives from one observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Most restrictive of the visibility and ceiling categories
    pub flight_rules: FlightRules,
    pub visibility_miles: f64,
    pub visibility_category: FlightRules,
    pub visibility_gauge: Gauge,
    pub ceiling: Ceiling,
    pub ceiling_altitude_feet: u32,
    pub ceiling_category: FlightRules,
    pub ceiling_gauge: Gauge,
    pub altimeter_inhg: f64,
    pub wind_gust_knots: Option<f64>,
    pub wind_cardinal: Option<String>,
    /// Whole percent, `None` when it can be neither read nor derived
    pub relative_humidity: Option<u8>,
    pub safety: SafetyFlags,
}

/// 16-point compass label for a wind direction
#[must_use]
pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
    match degrees {
        0..=11 | 349..=360 => "N",
        12..=33 => "NNE",
        34..=56 => "NE",
        57..=78 => "ENE",
        79..=101 => "E",
        102..=123 => "ESE",
        124..=146 => "SE",
        147..=168 => "SSE",
        169..=191 => "S",
        192..=213 => "SSW",
        214..=236 => "SW",
        237..=258 => "WSW",
        259..=281 => "W",
        282..=303 => "WNW",
        304..=326 => "NW",
        327..=348 => "NNW",
        _ => "Unknown",
    }
}
