//! Observation plus derived metrics, as served to the dashboard

use std::fmt::{self, Display};

use serde::Serialize;

use crate::classification::derive_metrics;
use crate::models::{DerivedMetrics, FlightRules, Observation, ObservationTime, StationId};

#[derive(Debug, Clone, Serialize)]
pub struct MetarReport {
    pub station: StationId,
    pub observed_at: ObservationTime,
    pub raw: String,
    /// Category as computed by the provider, verbatim
    pub reported_flight_rules: Option<FlightRules>,
    pub observation: Observation,
    /// `None` when the observation could not be classified
    pub metrics: Option<DerivedMetrics>,
    pub metrics_error: Option<String>,
}

impl MetarReport {
    /// Run the classification engine over a fresh observation.
    ///
    /// Classification failures degrade the report instead of failing it.
    pub fn build(observation: Observation) -> Self {
        let (metrics, metrics_error) = match derive_metrics(&observation) {
            Ok(metrics) => (Some(metrics), None),
            Err(err) => {
                tracing::warn!(station = %observation.station, "Unable to classify report: {err}");
                (None, Some(err.to_string()))
            }
        };

        if let (Some(reported), Some(metrics)) = (observation.reported_flight_rules, &metrics) {
            if reported != metrics.flight_rules {
                tracing::info!(
                    station = %observation.station,
                    "Provider reports {reported}, recomputed {}",
                    metrics.flight_rules
                );
            }
        }

        Self {
            station: observation.station.clone(),
            observed_at: observation.observed_at.clone(),
            raw: observation.raw.clone(),
            reported_flight_rules: observation.reported_flight_rules,
            observation,
            metrics,
            metrics_error,
        }
    }
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

impl Display for MetarReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let obs = &self.observation;
        writeln!(f, "{}  {}", self.station, self.observed_at.repr)?;
        writeln!(f, "   {}", self.raw)?;

        let Some(metrics) = &self.metrics else {
            writeln!(f, "   Flight rules: N/A ({})", or_na(self.metrics_error.as_ref()))?;
            return Ok(());
        };

        writeln!(
            f,
            "   Flight rules: {} ({}), provider reports {}",
            metrics.flight_rules,
            metrics.flight_rules.description(),
            or_na(self.reported_flight_rules)
        )?;
        writeln!(
            f,
            "   Visibility:   {:.1} SM [{}]",
            metrics.visibility_miles, metrics.visibility_category
        )?;
        if metrics.ceiling.is_unlimited() {
            writeln!(f, "   Ceiling:      none [{}]", metrics.ceiling_category)?;
        } else {
            writeln!(
                f,
                "   Ceiling:      {} ft [{}]",
                metrics.ceiling_altitude_feet, metrics.ceiling_category
            )?;
        }
        writeln!(
            f,
            "   Altimeter:    {:.2} inHg ({:?})",
            metrics.altimeter_inhg, metrics.safety.altimeter
        )?;
        writeln!(
            f,
            "   Wind:         {} at {} {}, gusts {} ({:?})",
            or_na(metrics.wind_cardinal.as_ref()),
            obs.wind_speed.value,
            obs.wind_speed.unit.symbol(),
            metrics
                .wind_gust_knots
                .map_or_else(|| "none".to_string(), |g| format!("{g:.0} kt")),
            metrics.safety.wind_gust
        )?;
        writeln!(
            f,
            "   Temp/Dew:     {} / {}",
            or_na(obs.temperature.map(|t| format!("{}{}", t.value, t.unit.symbol()))),
            or_na(obs.dewpoint.map(|t| format!("{}{}", t.value, t.unit.symbol())))
        )?;
        writeln!(
            f,
            "   Humidity:     {}",
            or_na(metrics.relative_humidity.map(|h| format!("{h}%")))
        )?;
        for layer in &obs.clouds {
            writeln!(
                f,
                "   Clouds:       {} at {} ft",
                layer.coverage.code(),
                or_na(layer.altitude_feet())
            )?;
        }
        Ok(())
    }
}
