// Measurement domain model
use chrono::{DateTime, Utc};

/// One sensor reading. Any metric may be absent, meaning "not measured"
/// (never zero). Read-only from the dashboard's point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub id: i64,
    pub station: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
}

impl Measurement {
    pub fn metric(&self, field: MetricField) -> Option<f64> {
        match field {
            MetricField::Temperature => self.temperature,
            MetricField::Humidity => self.humidity,
            MetricField::Pm25 => self.pm25,
            MetricField::Pm10 => self.pm10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricField {
    Temperature,
    Humidity,
    Pm25,
    Pm10,
}

impl MetricField {
    pub const ALL: [MetricField; 4] = [
        MetricField::Temperature,
        MetricField::Humidity,
        MetricField::Pm25,
        MetricField::Pm10,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MetricField::Temperature => "Temperature",
            MetricField::Humidity => "Humidity",
            MetricField::Pm25 => "PM2.5",
            MetricField::Pm10 => "PM10",
        }
    }

    /// Stable lowercase key, used for series ids and export columns.
    pub fn key(&self) -> &'static str {
        match self {
            MetricField::Temperature => "temperature",
            MetricField::Humidity => "humidity",
            MetricField::Pm25 => "pm25",
            MetricField::Pm10 => "pm10",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricField::Temperature => "°C",
            MetricField::Humidity => "%",
            MetricField::Pm25 | MetricField::Pm10 => "µg/m³",
        }
    }
}

/// The latest measurement is the one with the maximum timestamp; id breaks
/// ties when timestamps collide. Never relies on the slice being pre-sorted.
pub fn latest_of(records: &[Measurement]) -> Option<&Measurement> {
    records.iter().max_by_key(|m| (m.timestamp, m.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn reading(id: i64, ts: &str) -> Measurement {
        Measurement {
            id,
            station: "LIA".to_string(),
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S")
                .unwrap()
                .and_utc(),
            temperature: None,
            humidity: None,
            pm25: None,
            pm10: None,
        }
    }

    #[test]
    fn test_latest_by_timestamp() {
        let records = vec![
            reading(1, "2024-01-02T00:00:00"),
            reading(2, "2024-01-01T00:00:00"),
        ];
        assert_eq!(latest_of(&records).map(|m| m.id), Some(1));
    }

    #[test]
    fn test_latest_tie_broken_by_id() {
        let records = vec![
            reading(7, "2024-01-01T00:00:00"),
            reading(9, "2024-01-01T00:00:00"),
        ];
        assert_eq!(latest_of(&records).map(|m| m.id), Some(9));
    }

    #[test]
    fn test_latest_of_empty() {
        assert!(latest_of(&[]).is_none());
    }
}
