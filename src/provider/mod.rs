//! Observation ingestion
//!
//! Providers turn an airport code into a normalized [`Observation`]. The
//! classification engine never calls them; request handlers await a provider
//! and pass the result on.

pub mod avwx;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{Observation, StationId};

pub use avwx::{AvwxClient, AvwxMetar};

/// Source of current observations
#[async_trait]
pub trait ObservationProvider: Send + Sync {
    async fn fetch_observation(&self, station: &StationId) -> Result<Observation, FetchError>;
}
