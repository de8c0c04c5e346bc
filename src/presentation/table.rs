// Table adapter - threshold-classified cells, summary statistics, and the
// mutually exclusive view states
use serde::{Deserialize, Serialize};

use crate::domain::measurement::{Measurement, MetricField};

/// Per-metric alert ceilings. Display configuration only; injected into the
/// adapter so tests can supply fixed values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature: None,
            humidity: None,
            pm25: Some(25.0),
            pm10: Some(50.0),
        }
    }
}

impl Thresholds {
    pub fn ceiling(&self, field: MetricField) -> Option<f64> {
        match field {
            MetricField::Temperature => self.temperature,
            MetricField::Humidity => self.humidity,
            MetricField::Pm25 => self.pm25,
            MetricField::Pm10 => self.pm10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricStatus {
    NotAvailable,
    Normal,
    Warning,
}

/// Absent readings classify as "not available", never as a warning.
pub fn classify(value: Option<f64>, ceiling: Option<f64>) -> MetricStatus {
    match value {
        None => MetricStatus::NotAvailable,
        Some(v) => match ceiling {
            Some(limit) if v > limit => MetricStatus::Warning,
            _ => MetricStatus::Normal,
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCell {
    pub field: MetricField,
    pub text: String,
    pub status: MetricStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: i64,
    pub timestamp: String,
    pub cells: Vec<MetricCell>,
}

pub struct TableAdapter {
    thresholds: Thresholds,
}

impl TableAdapter {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn rows(&self, page: &[Measurement]) -> Vec<TableRow> {
        page.iter().map(|m| self.row(m)).collect()
    }

    pub fn row(&self, record: &Measurement) -> TableRow {
        let cells = MetricField::ALL
            .into_iter()
            .map(|field| {
                let value = record.metric(field);
                MetricCell {
                    field,
                    text: match value {
                        Some(v) => format!("{v:.1} {}", field.unit()),
                        None => "N/A".to_string(),
                    },
                    status: classify(value, self.thresholds.ceiling(field)),
                }
            })
            .collect();

        TableRow {
            id: record.id,
            timestamp: format_timestamp(record),
            cells,
        }
    }
}

/// dd-mm-yyyy hh:mm, the backend's locale convention.
pub fn format_timestamp(record: &Measurement) -> String {
    record.timestamp.format("%d-%m-%Y %H:%M").to_string()
}

/// Mean/min/max over present values plus the raw sequence for sparklines.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub trend: Vec<f64>,
}

pub fn summarize(records: &[Measurement], field: MetricField) -> Option<MetricSummary> {
    let values: Vec<f64> = records.iter().filter_map(|m| m.metric(field)).collect();
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(MetricSummary {
        mean,
        min,
        max,
        trend: values,
    })
}

/// The three mutually exclusive feed states, plus a dismissible error that
/// keeps the previously loaded rows on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedView {
    Loading,
    Empty,
    Ready { rows: Vec<TableRow> },
    Error { message: String, rows: Vec<TableRow> },
}

impl FeedView {
    pub fn ready(rows: Vec<TableRow>) -> Self {
        if rows.is_empty() {
            FeedView::Empty
        } else {
            FeedView::Ready { rows }
        }
    }
}
