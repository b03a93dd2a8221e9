//! Flight-rule classification of a single dimension

use crate::error::MetricsError;
use crate::models::FlightRules;

/// Classify visibility in statute miles.
///
/// VFR above 5, MVFR from 3 to 5 inclusive, IFR from 1 up to (not including) 3,
/// LIFR below 1.
pub fn classify_by_visibility(visibility_miles: f64) -> Result<FlightRules, MetricsError> {
    let miles = non_negative("visibility", visibility_miles)?;
    Ok(if miles > 5.0 {
        FlightRules::Vfr
    } else if miles >= 3.0 {
        FlightRules::Mvfr
    } else if miles >= 1.0 {
        FlightRules::Ifr
    } else {
        FlightRules::Lifr
    })
}

/// Classify a ceiling altitude in feet.
///
/// VFR above 3000, MVFR from 1000 to 3000 inclusive, IFR from 500 up to (not
/// including) 1000, LIFR below 500.
pub fn classify_by_ceiling(ceiling_feet: f64) -> Result<FlightRules, MetricsError> {
    let feet = non_negative("ceiling", ceiling_feet)?;
    Ok(if feet > 3000.0 {
        FlightRules::Vfr
    } else if feet >= 1000.0 {
        FlightRules::Mvfr
    } else if feet >= 500.0 {
        FlightRules::Ifr
    } else {
        FlightRules::Lifr
    })
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<f64, MetricsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MetricsError::invalid(field, value))
    }
}
