//! Vaayu - METAR weather dashboard backend
//!
//! Fetches decoded METAR observations from AVWX, classifies them into
//! flight-rule categories with safety flags, and serves the result as JSON.

pub mod api;
pub mod cache;
pub mod classification;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod provider;
pub mod report;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use cache::{CachedProvider, ObservationCache};
pub use classification::derive_metrics;
pub use config::VaayuConfig;
pub use error::{FetchError, MetricsError, VaayuError};
pub use history::StationHistory;
pub use models::{DerivedMetrics, FlightRules, Observation, StationId};
pub use provider::{AvwxClient, ObservationProvider};
pub use report::MetarReport;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, VaayuError>;
