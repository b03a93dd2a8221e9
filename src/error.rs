//! Error types and handling for the Vaayu application

use thiserror::Error;

/// Failures of the classification engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// A numeric input is negative, non-finite or otherwise physically impossible
    #[error("Invalid {field} measurement: {value}")]
    InvalidMeasurement { field: &'static str, value: f64 },

    /// A derivation was requested without one of its inputs
    #[error("Cannot derive value without {field}")]
    MissingDependentField { field: &'static str },
}

impl MetricsError {
    pub fn invalid(field: &'static str, value: f64) -> Self {
        Self::InvalidMeasurement { field, value }
    }

    pub fn missing(field: &'static str) -> Self {
        Self::MissingDependentField { field }
    }
}

/// Failures of the observation provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Station not found: {0}")]
    StationNotFound(String),

    #[error("Weather provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Weather provider rate limit exceeded")]
    UpstreamRateLimited { retry_after_secs: Option<u64> },

    #[error("Malformed weather provider response: {0}")]
    MalformedUpstreamResponse(String),
}

/// Main error type for the Vaayu application
#[derive(Error, Debug)]
pub enum VaayuError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Observation provider errors
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Classification engine errors
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl VaayuError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Stable machine-readable kind, used in HTTP error bodies
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            VaayuError::Config { .. } => "config",
            VaayuError::Validation { .. } => "invalid_input",
            VaayuError::Fetch(FetchError::StationNotFound(_)) => "station_not_found",
            VaayuError::Fetch(FetchError::UpstreamUnavailable(_)) => "upstream_unavailable",
            VaayuError::Fetch(FetchError::UpstreamRateLimited { .. }) => "upstream_rate_limited",
            VaayuError::Fetch(FetchError::MalformedUpstreamResponse(_)) => "malformed_upstream_response",
            VaayuError::Metrics(MetricsError::InvalidMeasurement { .. }) => "invalid_measurement",
            VaayuError::Metrics(MetricsError::MissingDependentField { .. }) => "missing_dependent_field",
            VaayuError::Io { .. } => "io",
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            VaayuError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            VaayuError::Validation { message } => format!("Invalid input: {message}"),
            VaayuError::Fetch(FetchError::StationNotFound(station)) => {
                format!("No METAR report found for station {station}.")
            }
            VaayuError::Fetch(FetchError::UpstreamRateLimited {
                retry_after_secs: Some(secs),
            }) => format!("Weather provider is rate limiting requests. Try again in {secs} seconds."),
            VaayuError::Fetch(FetchError::UpstreamRateLimited { .. }) => {
                "Weather provider is rate limiting requests. Try again shortly.".to_string()
            }
            VaayuError::Fetch(_) => {
                "Unable to get weather data from the provider. Please try again later.".to_string()
            }
            VaayuError::Metrics(err) => format!("Unable to classify report: {err}"),
            VaayuError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = VaayuError::config("missing API key");
        assert!(matches!(config_err, VaayuError::Config { .. }));

        let validation_err = VaayuError::validation("invalid airport code");
        assert!(matches!(validation_err, VaayuError::Validation { .. }));

        let fetch_err: VaayuError = FetchError::StationNotFound("ZZZZ".into()).into();
        assert!(matches!(fetch_err, VaayuError::Fetch(FetchError::StationNotFound(_))));
    }

    #[test]
    fn test_user_messages() {
        let config_err = VaayuError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let not_found: VaayuError = FetchError::StationNotFound("ZZZZ".into()).into();
        assert!(not_found.user_message().contains("ZZZZ"));

        let limited: VaayuError = FetchError::UpstreamRateLimited {
            retry_after_secs: Some(30),
        }
        .into();
        assert!(limited.user_message().contains("30 seconds"));

        let validation_err = VaayuError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }

    #[test]
    fn test_codes() {
        let invalid: VaayuError = MetricsError::invalid("visibility", -1.0).into();
        assert_eq!(invalid.code(), "invalid_measurement");

        let malformed: VaayuError = FetchError::MalformedUpstreamResponse("x".into()).into();
        assert_eq!(malformed.code(), "malformed_upstream_response");
    }

    #[test]
    fn test_metrics_error_display() {
        let err = MetricsError::invalid("altimeter", f64::NAN);
        assert_eq!(err.to_string(), "Invalid altimeter measurement: NaN");

        let err = MetricsError::missing("dewpoint");
        assert_eq!(err.to_string(), "Cannot derive value without dewpoint");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VaayuError = io_err.into();
        assert!(matches!(err, VaayuError::Io { .. }));
    }
}
