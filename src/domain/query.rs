// Query filter domain model - the full set of user-chosen view parameters
use chrono::NaiveDate;
use thiserror::Error;

use super::measurement::MetricField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Timestamp,
    Metric(MetricField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Inclusive numeric bounds for one metric. An unset side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl MetricRange {
    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeFilters {
    pub temperature: MetricRange,
    pub humidity: MetricRange,
    pub pm25: MetricRange,
    pub pm10: MetricRange,
}

impl RangeFilters {
    pub fn for_field(&self, field: MetricField) -> MetricRange {
        match field {
            MetricField::Temperature => self.temperature,
            MetricField::Humidity => self.humidity,
            MetricField::Pm25 => self.pm25,
            MetricField::Pm10 => self.pm10,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricField, MetricRange)> + '_ {
        MetricField::ALL.into_iter().map(|f| (f, self.for_field(f)))
    }
}

/// View criteria for one station's feed. Lives only in client state and is
/// validated before any network call.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub station: String,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub page: usize,
    pub page_size: usize,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub ranges: RangeFilters,
}

impl QueryFilter {
    pub fn for_station(station: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            date_from: None,
            date_to: None,
            page: 0,
            page_size: 10,
            sort_field: SortField::Timestamp,
            sort_direction: SortDirection::Asc,
            ranges: RangeFilters::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.station.is_empty() {
            return Err(ValidationError::MissingStation);
        }
        if self.page_size == 0 {
            return Err(ValidationError::ZeroPageSize);
        }
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(ValidationError::DateRange { from, to });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no station selected")]
    MissingStation,

    #[error("date range start {from} is after end {to}")]
    DateRange { from: NaiveDate, to: NaiveDate },

    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_valid() {
        let filter = QueryFilter::for_station("Estacion_LIA_SantoTomas");
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn test_inverted_date_range_is_rejected() {
        let mut filter = QueryFilter::for_station("Estacion_LIA_SantoTomas");
        filter.date_from = NaiveDate::from_ymd_opt(2024, 2, 1);
        filter.date_to = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(matches!(
            filter.validate(),
            Err(ValidationError::DateRange { .. })
        ));
    }

    #[test]
    fn test_missing_station_is_rejected() {
        let filter = QueryFilter::for_station("");
        assert_eq!(filter.validate(), Err(ValidationError::MissingStation));
    }

    #[test]
    fn test_range_contains() {
        let range = MetricRange {
            min: Some(10.0),
            max: Some(25.0),
        };
        assert!(range.contains(10.0));
        assert!(range.contains(25.0));
        assert!(!range.contains(30.0));
        assert!(!MetricRange::default().is_active());
    }
}
