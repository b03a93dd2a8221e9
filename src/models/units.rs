//! Reporting units and conversions to the units the flight-rule thresholds use

use std::str::FromStr;

use serde::{Deserialize, Serialize};

const METERS_PER_STATUTE_MILE: f64 = 1609.344;
const HPA_PER_INHG: f64 = 33.8639;
const KNOTS_PER_MPS: f64 = 1.943_844;
const KMH_PER_KNOT: f64 = 1.852;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    StatuteMiles,
    Meters,
    Kilometers,
}

impl DistanceUnit {
    #[must_use]
    pub fn to_statute_miles(self, value: f64) -> f64 {
        match self {
            DistanceUnit::StatuteMiles => value,
            DistanceUnit::Meters => value / METERS_PER_STATUTE_MILE,
            DistanceUnit::Kilometers => value * 1000.0 / METERS_PER_STATUTE_MILE,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sm" | "mi" => Ok(DistanceUnit::StatuteMiles),
            "m" => Ok(DistanceUnit::Meters),
            "km" => Ok(DistanceUnit::Kilometers),
            other => Err(format!("unknown distance unit '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureUnit {
    InchesOfMercury,
    Hectopascals,
}

impl PressureUnit {
    #[must_use]
    pub fn to_inhg(self, value: f64) -> f64 {
        match self {
            PressureUnit::InchesOfMercury => value,
            PressureUnit::Hectopascals => value / HPA_PER_INHG,
        }
    }
}

impl FromStr for PressureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inhg" => Ok(PressureUnit::InchesOfMercury),
            "hpa" | "mb" => Ok(PressureUnit::Hectopascals),
            other => Err(format!("unknown pressure unit '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    Knots,
    MetersPerSecond,
    KilometersPerHour,
}

impl SpeedUnit {
    #[must_use]
    pub fn to_knots(self, value: f64) -> f64 {
        match self {
            SpeedUnit::Knots => value,
            SpeedUnit::MetersPerSecond => value * KNOTS_PER_MPS,
            SpeedUnit::KilometersPerHour => value / KMH_PER_KNOT,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            SpeedUnit::Knots => "kt",
            SpeedUnit::MetersPerSecond => "m/s",
            SpeedUnit::KilometersPerHour => "km/h",
        }
    }
}

impl FromStr for SpeedUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kt" | "kts" | "knots" => Ok(SpeedUnit::Knots),
            "m/s" | "mps" => Ok(SpeedUnit::MetersPerSecond),
            "km/h" | "kmh" | "kph" => Ok(SpeedUnit::KilometersPerHour),
            other => Err(format!("unknown speed unit '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    #[must_use]
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" => Ok(TemperatureUnit::Celsius),
            "F" => Ok(TemperatureUnit::Fahrenheit),
            other => Err(format!("unknown temperature unit '{other}'")),
        }
    }
}
