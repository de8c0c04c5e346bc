// Export adapter - flat records for external encoders, plus plain CSV text
use serde::Serialize;

use crate::domain::measurement::Measurement;
use crate::presentation::table::format_timestamp;

pub const CSV_HEADER: [&str; 5] = ["Date", "Temperature", "Humidity", "PM2.5", "PM10"];

/// One flat row per measurement. Serializable so external encoders (XLSX,
/// PDF) can consume it as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub date: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
}

pub fn export_records(rows: &[Measurement]) -> Vec<ExportRecord> {
    rows.iter()
        .map(|m| ExportRecord {
            date: format_timestamp(m),
            temperature: m.temperature,
            humidity: m.humidity,
            pm25: m.pm25,
            pm10: m.pm10,
        })
        .collect()
}

/// Comma-joined text with a header line; absent readings become empty cells.
pub fn to_csv(records: &[ExportRecord]) -> String {
    let mut lines = vec![CSV_HEADER.join(",")];
    for record in records {
        lines.push(
            [
                record.date.clone(),
                cell(record.temperature),
                cell(record.humidity),
                cell(record.pm25),
                cell(record.pm10),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
