//! Data models for the Vaayu application
//!
//! This module contains the core domain models organized by concern:
//! - Observation: the normalized report handed over by the provider
//! - Metrics: flight-rule categories and everything derived from a report
//! - Units: reporting units and their conversions

pub mod metrics;
pub mod observation;
pub mod units;

// Re-export all public types for convenient access
pub use metrics::{
    CEILING_UNLIMITED_FT, Ceiling, DerivedMetrics, FlightRules, Gauge, SafetyFlags, SafetyStatus,
    wind_direction_to_cardinal,
};
pub use observation::{
    CloudCoverage, CloudLayer, Measurement, Observation, ObservationTime, StationId,
};
pub use units::{DistanceUnit, PressureUnit, SpeedUnit, TemperatureUnit};
