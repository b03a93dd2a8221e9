//! Safety highlighting for altimeter and wind gust

use super::flight_rules::non_negative;
use crate::error::MetricsError;
use crate::models::SafetyStatus;

/// Altimeter settings below this are highlighted, in inHg
pub const ALTIMETER_LOW_INHG: f64 = 29.70;

/// Gusts above this are highlighted, in knots
pub const GUST_HIGH_KNOTS: f64 = 20.0;

/// Unsafe below 29.70 inHg; 29.70 itself is safe.
pub fn evaluate_altimeter(altimeter_inhg: f64) -> Result<SafetyStatus, MetricsError> {
    if !altimeter_inhg.is_finite() || altimeter_inhg <= 0.0 {
        return Err(MetricsError::invalid("altimeter", altimeter_inhg));
    }
    Ok(if altimeter_inhg < ALTIMETER_LOW_INHG {
        SafetyStatus::Unsafe
    } else {
        SafetyStatus::Safe
    })
}

/// Unsafe above 20 kt. No reported gust compares as zero.
pub fn evaluate_gust(gust_knots: Option<f64>) -> Result<SafetyStatus, MetricsError> {
    let gust = match gust_knots {
        Some(knots) => non_negative("wind gust", knots)?,
        None => 0.0,
    };
    Ok(if gust > GUST_HIGH_KNOTS {
        SafetyStatus::Unsafe
    } else {
        SafetyStatus::Safe
    })
}
