// Station service - Use cases for listing stations and seeding the view
use std::sync::Arc;

use chrono::{Days, NaiveDate};

use crate::application::gateway::{FetchError, MeasurementGateway};
use crate::domain::station::Station;

const RECENT_WINDOW: usize = 60;
const DATE_PADDING_DAYS: u64 = 10;

#[derive(Clone)]
pub struct StationService {
    gateway: Arc<dyn MeasurementGateway>,
}

impl StationService {
    pub fn new(gateway: Arc<dyn MeasurementGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list_stations(&self) -> Result<Vec<Station>, FetchError> {
        self.gateway.list_stations().await
    }

    /// Default date range for a freshly selected station: the span of its
    /// most recent records, padded ten days on both sides. `None` when the
    /// station has no data yet.
    pub async fn default_date_range(
        &self,
        station: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate)>, FetchError> {
        let recent = self.gateway.fetch_recent(station, RECENT_WINDOW).await?;
        let timestamps = recent.iter().map(|m| m.timestamp.date_naive());
        let Some(min) = timestamps.clone().min() else {
            return Ok(None);
        };
        let Some(max) = timestamps.max() else {
            return Ok(None);
        };

        let padding = Days::new(DATE_PADDING_DAYS);
        let from = min.checked_sub_days(padding).unwrap_or(min);
        let to = max.checked_add_days(padding).unwrap_or(max);
        Ok(Some((from, to)))
    }
}
