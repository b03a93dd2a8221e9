//! Weather classification engine
//!
//! Turns a normalized [`Observation`] into the [`DerivedMetrics`] shown on the
//! dashboard:
//! - flight-rule categories from visibility and ceiling, and their worst-of
//! - ceiling resolution from cloud layers
//! - altimeter and gust safety highlighting
//! - relative humidity, read or derived from temperature and dewpoint
//!
//! Everything here is pure and synchronous. Inputs are converted to statute
//! miles, feet, inHg and knots before any threshold is applied.

pub mod ceiling;
pub mod flight_rules;
pub mod humidity;
pub mod safety;

pub use ceiling::resolve_ceiling;
pub use flight_rules::{classify_by_ceiling, classify_by_visibility};
pub use humidity::{derive_relative_humidity, round_humidity};
pub use safety::{evaluate_altimeter, evaluate_gust};

use crate::error::MetricsError;
use crate::models::metrics::{CEILING_GAUGE_MAX_FT, VISIBILITY_GAUGE_MAX_SM};
use crate::models::{
    DerivedMetrics, Gauge, Observation, SafetyFlags, SafetyStatus, wind_direction_to_cardinal,
};

/// Compute every derived metric for one observation.
///
/// Fails with [`MetricsError::InvalidMeasurement`] on the first negative or
/// non-finite reading. Missing humidity inputs are not an error; humidity is
/// then reported as unavailable.
pub fn derive_metrics(observation: &Observation) -> Result<DerivedMetrics, MetricsError> {
    let visibility_miles = observation
        .visibility
        .unit
        .to_statute_miles(observation.visibility.value);
    let visibility_category = classify_by_visibility(visibility_miles)?;

    let ceiling = resolve_ceiling(&observation.clouds)?;
    let ceiling_altitude_feet = ceiling.altitude_feet();
    let ceiling_category = classify_by_ceiling(f64::from(ceiling_altitude_feet))?;

    let altimeter_inhg = observation
        .altimeter
        .unit
        .to_inhg(observation.altimeter.value);
    let altimeter_status = evaluate_altimeter(altimeter_inhg)?;

    let wind_gust_knots = observation
        .wind_gust
        .map(|gust| gust.unit.to_knots(gust.value));
    let gust_status = evaluate_gust(wind_gust_knots)?;

    let relative_humidity = resolve_humidity(observation)?;

    Ok(DerivedMetrics {
        flight_rules: visibility_category.worst_of(ceiling_category),
        visibility_miles,
        visibility_category,
        visibility_gauge: Gauge::new(visibility_miles, VISIBILITY_GAUGE_MAX_SM),
        ceiling,
        ceiling_altitude_feet,
        ceiling_category,
        ceiling_gauge: Gauge::new(f64::from(ceiling_altitude_feet), CEILING_GAUGE_MAX_FT),
        altimeter_inhg,
        wind_gust_knots,
        wind_cardinal: observation
            .wind_direction
            .map(|degrees| wind_direction_to_cardinal(degrees).to_string()),
        relative_humidity,
        safety: SafetyFlags {
            altimeter: altimeter_status,
            wind_gust: gust_status,
            temperature: SafetyStatus::Neutral,
            dewpoint: SafetyStatus::Neutral,
            humidity: SafetyStatus::Neutral,
        },
    })
}

fn resolve_humidity(observation: &Observation) -> Result<Option<u8>, MetricsError> {
    if let Some(percent) = observation.relative_humidity {
        return round_humidity(percent).map(Some);
    }
    match derive_relative_humidity(observation.temperature.as_ref(), observation.dewpoint.as_ref())
    {
        Ok(percent) => Ok(Some(percent)),
        Err(MetricsError::MissingDependentField { field }) => {
            tracing::debug!(
                station = %observation.station,
                "Relative humidity unavailable, no {field} reported"
            );
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
