// Wire DTOs for the measurement backend's JSON payloads
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::application::gateway::FetchError;
use crate::domain::measurement::Measurement;
use crate::domain::station::Station;

#[derive(Debug, Deserialize)]
pub struct MeasurementDto {
    pub id: i64,
    pub fecha: String,
    #[serde(default)]
    pub temperatura: Option<f64>,
    #[serde(default)]
    pub humedad: Option<f64>,
    #[serde(default)]
    pub pm25: Option<f64>,
    #[serde(default)]
    pub pm10: Option<f64>,
}

impl MeasurementDto {
    /// The wire record carries no station; it is tagged with the station the
    /// query was issued for.
    pub fn into_domain(self, station: &str) -> Result<Measurement, FetchError> {
        Ok(Measurement {
            id: self.id,
            station: station.to_string(),
            timestamp: parse_timestamp(&self.fecha)?,
            temperature: self.temperatura,
            humidity: self.humedad,
            pm25: self.pm25,
            pm10: self.pm10,
        })
    }
}

/// The backend reports timestamps as ISO-8601, with or without a zone
/// suffix; both forms are read as UTC instants.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, FetchError> {
    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return Ok(zoned.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| FetchError::Payload(format!("unparseable timestamp {raw:?}")))
}

#[derive(Debug, Deserialize)]
pub struct StationDto {
    #[serde(rename = "id_central")]
    pub id: i64,
    #[serde(rename = "nombre_central")]
    pub name: String,
}

impl StationDto {
    pub fn into_domain(self) -> Station {
        Station::new(self.id, self.name)
    }
}
