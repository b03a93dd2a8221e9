//! Relative humidity from temperature and dewpoint

use crate::error::MetricsError;
use crate::models::{Measurement, TemperatureUnit};

// Magnus coefficients over water
const MAGNUS_A: f64 = 6.1094;
const MAGNUS_B: f64 = 17.625;
const MAGNUS_C: f64 = 243.04;

/// Derive relative humidity as a whole percent in `[0, 100]`.
///
/// Uses the ratio of saturation vapour pressures at dewpoint and temperature.
pub fn derive_relative_humidity(
    temperature: Option<&Measurement<TemperatureUnit>>,
    dewpoint: Option<&Measurement<TemperatureUnit>>,
) -> Result<u8, MetricsError> {
    let temperature = temperature.ok_or_else(|| MetricsError::missing("temperature"))?;
    let dewpoint = dewpoint.ok_or_else(|| MetricsError::missing("dewpoint"))?;

    let t = celsius("temperature", temperature)?;
    let td = celsius("dewpoint", dewpoint)?;

    let ratio = saturation_vapour_pressure(td) / saturation_vapour_pressure(t);
    if !ratio.is_finite() {
        return Err(MetricsError::invalid("dewpoint", dewpoint.value));
    }
    Ok(to_percent(ratio * 100.0))
}

/// Round a reported humidity percentage for display.
pub fn round_humidity(percent: f64) -> Result<u8, MetricsError> {
    if !percent.is_finite() {
        return Err(MetricsError::invalid("relative humidity", percent));
    }
    Ok(to_percent(percent))
}

fn celsius(
    field: &'static str,
    measurement: &Measurement<TemperatureUnit>,
) -> Result<f64, MetricsError> {
    let value = measurement.unit.to_celsius(measurement.value);
    // the Magnus formula has a pole at -243.04 °C
    if !value.is_finite() || value <= -MAGNUS_C {
        return Err(MetricsError::invalid(field, measurement.value));
    }
    Ok(value)
}

fn saturation_vapour_pressure(celsius: f64) -> f64 {
    MAGNUS_A * (MAGNUS_B * celsius / (MAGNUS_C + celsius)).exp()
}

fn to_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn c(value: f64) -> Measurement<TemperatureUnit> {
        Measurement::new(value, TemperatureUnit::Celsius)
    }

    #[test]
    fn test_saturated_air_is_hundred_percent() {
        assert_eq!(derive_relative_humidity(Some(&c(15.0)), Some(&c(15.0))), Ok(100));
    }

    #[test]
    fn test_typical_values() {
        assert_eq!(derive_relative_humidity(Some(&c(20.0)), Some(&c(10.0))), Ok(53));
        assert_eq!(derive_relative_humidity(Some(&c(25.0)), Some(&c(20.0))), Ok(74));
        assert_eq!(derive_relative_humidity(Some(&c(-5.0)), Some(&c(-10.0))), Ok(68));
    }

    #[test]
    fn test_fahrenheit_inputs_are_converted() {
        let t = Measurement::new(68.0, TemperatureUnit::Fahrenheit);
        let td = Measurement::new(50.0, TemperatureUnit::Fahrenheit);
        assert_eq!(derive_relative_humidity(Some(&t), Some(&td)), Ok(53));
    }

    #[test]
    fn test_dewpoint_above_temperature_is_clamped() {
        assert_eq!(derive_relative_humidity(Some(&c(10.0)), Some(&c(12.0))), Ok(100));
    }

    #[test]
    fn test_missing_inputs() {
        assert_eq!(
            derive_relative_humidity(None, Some(&c(10.0))),
            Err(MetricsError::missing("temperature"))
        );
        assert_eq!(
            derive_relative_humidity(Some(&c(10.0)), None),
            Err(MetricsError::missing("dewpoint"))
        );
    }

    #[test]
    fn test_round_humidity() {
        assert_eq!(round_humidity(53.4), Ok(53));
        assert_eq!(round_humidity(53.5), Ok(54));
        assert_eq!(round_humidity(104.0), Ok(100));
        assert_eq!(round_humidity(-3.0), Ok(0));
        assert!(round_humidity(f64::NAN).is_err());
    }

    #[rstest]
    #[case(-243.04)]
    #[case(-250.0)]
    #[case(-300.0)]
    fn test_temperature_at_or_below_magnus_pole_is_invalid(#[case] celsius: f64) {
        assert_eq!(
            derive_relative_humidity(Some(&c(celsius)), Some(&c(-10.0))),
            Err(MetricsError::invalid("temperature", celsius))
        );
        assert_eq!(
            derive_relative_humidity(Some(&c(10.0)), Some(&c(celsius))),
            Err(MetricsError::invalid("dewpoint", celsius))
        );
    }

    #[test]
    fn test_vanishing_vapour_pressure_is_invalid() {
        assert_eq!(
            derive_relative_humidity(Some(&c(-243.0)), Some(&c(-243.0))),
            Err(MetricsError::invalid("dewpoint", -243.0))
        );
    }
}
