// Gateway trait for the remote measurement backend
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::measurement::Measurement;
use crate::domain::query::QueryFilter;
use crate::domain::station::Station;

/// One server-side page of a range query plus the pagination totals the
/// backend reports alongside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementPage {
    pub records: Vec<Measurement>,
    pub total_elements: u64,
    pub total_pages: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to measurement backend failed: {0}")]
    Transport(String),

    #[error("measurement backend returned status {status}")]
    Status { status: u16 },

    #[error("malformed backend payload: {0}")]
    Payload(String),
}

#[async_trait]
pub trait MeasurementGateway: Send + Sync {
    /// Range query for one station, paginated server-side.
    async fn fetch_range(&self, filter: &QueryFilter) -> Result<MeasurementPage, FetchError>;

    /// The single most recent measurement for a station, if any.
    async fn fetch_latest(&self, station: &str) -> Result<Option<Measurement>, FetchError>;

    /// The most recent `limit` measurements for a station, newest first.
    async fn fetch_recent(
        &self,
        station: &str,
        limit: usize,
    ) -> Result<Vec<Measurement>, FetchError>;

    /// List all monitoring stations.
    async fn list_stations(&self) -> Result<Vec<Station>, FetchError>;
}
