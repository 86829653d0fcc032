//! Rate data: compiled-in tables and the ECB Data Portal client.

pub mod decisions;
pub mod ecb;
pub mod store;

pub use ecb::{EcbClient, EcbConfig, RawObservation};

use crate::domain::SeriesKind;
use crate::error::RateError;

/// Where refreshed observations come from.
///
/// Implementations must be shareable across threads: the service fetches
/// all three series concurrently.
pub trait ObservationSource: Sync {
    fn fetch_observations(
        &self,
        kind: SeriesKind,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<RawObservation>, RateError>;
}

/// A source that never reaches the network; every series falls back.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl ObservationSource for OfflineSource {
    fn fetch_observations(&self, _kind: SeriesKind, _start: i32, _end: i32) -> Result<Vec<RawObservation>, RateError> {
        Err(RateError::RemoteFetchFailed("offline mode".to_string()))
    }
}

/// The source a dashboard run actually uses, picked once at startup.
pub enum LiveSource {
    Ecb(EcbClient),
    Offline(OfflineSource),
}

impl LiveSource {
    /// Offline when either the flag or `ECB_OFFLINE` asks for it.
    pub fn from_config(config: &EcbConfig, offline: bool) -> Result<Self, crate::error::AppError> {
        if offline || config.offline {
            Ok(Self::Offline(OfflineSource))
        } else {
            Ok(Self::Ecb(EcbClient::new(config)?))
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline(_))
    }
}

impl ObservationSource for LiveSource {
    fn fetch_observations(
        &self,
        kind: SeriesKind,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<RawObservation>, RateError> {
        match self {
            Self::Ecb(client) => client.fetch_observations(kind, start_year, end_year),
            Self::Offline(source) => source.fetch_observations(kind, start_year, end_year),
        }
    }
}
