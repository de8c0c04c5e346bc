// Measurement store - holds the current window of records for one query
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use thiserror::Error;

use crate::application::gateway::{FetchError, MeasurementGateway, MeasurementPage};
use crate::domain::measurement::{Measurement, latest_of};
use crate::domain::query::{QueryFilter, ValidationError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("page load superseded by a newer request")]
    Superseded,
}

/// Pagination totals reported by the backend for the last successful load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub total_elements: u64,
    pub total_pages: u32,
}

#[derive(Default)]
struct Snapshot {
    records: Vec<Measurement>,
    page_info: PageInfo,
}

/// In-memory window of measurement records for the active station and query.
/// The snapshot is replaced atomically by a completed `load_page` and is never
/// cleared by a failed or superseded one.
pub struct MeasurementStore {
    gateway: Arc<dyn MeasurementGateway>,
    snapshot: RwLock<Snapshot>,
    request_seq: AtomicU64,
}

impl MeasurementStore {
    pub fn new(gateway: Arc<dyn MeasurementGateway>) -> Self {
        Self {
            gateway,
            snapshot: RwLock::new(Snapshot::default()),
            request_seq: AtomicU64::new(0),
        }
    }

    /// Validates the filter, issues the range query, and commits the result.
    /// Last request wins: a response that arrives after a newer `load_page`
    /// was issued is discarded and reported as `StoreError::Superseded`.
    pub async fn load_page(&self, filter: &QueryFilter) -> Result<MeasurementPage, StoreError> {
        filter.validate()?;
        let seq = self.request_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let page = self.gateway.fetch_range(filter).await?;

        if self.request_seq.load(Ordering::SeqCst) != seq {
            tracing::debug!(seq, station = %filter.station, "discarding superseded page load");
            return Err(StoreError::Superseded);
        }

        let mut snapshot = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        snapshot.records = page.records.clone();
        snapshot.page_info = PageInfo {
            total_elements: page.total_elements,
            total_pages: page.total_pages,
        };
        Ok(page)
    }

    /// Current in-memory snapshot; empty if nothing was ever loaded.
    pub fn current(&self) -> Vec<Measurement> {
        self.read().records.clone()
    }

    /// Id of the most recent record in the snapshot, by timestamp then id.
    /// Named lookup rather than a positional one: the view engine may resort
    /// the displayed page independently of the snapshot order.
    pub fn latest_id(&self) -> Option<i64> {
        latest_of(&self.read().records).map(|m| m.id)
    }

    pub fn page_info(&self) -> PageInfo {
        self.read().page_info
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }
}
