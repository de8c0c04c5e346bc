// Chart-ready series built from a station's measurement window
use crate::domain::measurement::{Measurement, MetricField};

const MAX_POINTS_PER_SERIES: usize = 150;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub points: Vec<TimeSeriesPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub series: Vec<SeriesData>,
}

/// One chart per metric. Metrics with no present values in the window are
/// omitted rather than rendered empty.
pub fn charts(records: &[Measurement]) -> Vec<ChartData> {
    MetricField::ALL
        .into_iter()
        .filter_map(|field| chart_for(field, records))
        .collect()
}

pub fn chart_for(field: MetricField, records: &[Measurement]) -> Option<ChartData> {
    let points = series_points(records, field);
    if points.is_empty() {
        return None;
    }

    let series = SeriesData {
        id: field.key().to_string(),
        name: field.label().to_string(),
        color: Some(default_color(field).to_string()),
        points: downsample_points(points, MAX_POINTS_PER_SERIES),
    };

    Some(ChartData {
        id: field.key().to_string(),
        title: format!("{} ({})", field.label(), field.unit()),
        unit: Some(field.unit().to_string()),
        series: vec![series],
    })
}

fn series_points(records: &[Measurement], field: MetricField) -> Vec<TimeSeriesPoint> {
    let mut points: Vec<TimeSeriesPoint> = records
        .iter()
        .filter_map(|m| {
            m.metric(field)
                .map(|value| TimeSeriesPoint::new(m.timestamp.timestamp_millis(), value))
        })
        .collect();
    points.sort_by_key(|p| p.time_ms);
    points
}

fn default_color(field: MetricField) -> &'static str {
    match field {
        MetricField::Temperature => "#004F45",
        MetricField::Humidity => "#0288d1",
        MetricField::Pm25 => "#43a047",
        MetricField::Pm10 => "#d32f2f",
    }
}

/// Downsample with bucket averaging: middle point's timestamp, mean value.
fn downsample_points(points: Vec<TimeSeriesPoint>, max_points: usize) -> Vec<TimeSeriesPoint> {
    if points.is_empty() || points.len() <= max_points {
        return points;
    }

    let bucket_size = (points.len() as f64 / max_points as f64).ceil() as usize;
    let mut downsampled = Vec::with_capacity(max_points);

    for chunk in points.chunks(bucket_size) {
        let mid_idx = chunk.len() / 2;
        let avg_value = chunk.iter().map(|p| p.value).sum::<f64>() / chunk.len() as f64;
        downsampled.push(TimeSeriesPoint::new(chunk[mid_idx].time_ms, avg_value));
    }

    downsampled
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn reading(id: i64, ts: &str, pm25: Option<f64>) -> Measurement {
        Measurement {
            id,
            station: "A".to_string(),
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S")
                .unwrap()
                .and_utc(),
            temperature: None,
            humidity: None,
            pm25,
            pm10: None,
        }
    }

    #[test]
    fn test_only_metrics_with_data_get_charts() {
        let records = vec![
            reading(1, "2024-01-01T00:00:00", Some(10.0)),
            reading(2, "2024-01-02T00:00:00", Some(12.0)),
        ];
        let built = charts(&records);
        assert_eq!(built.len(), 1);
        assert_eq!(built[0].id, "pm25");
        assert_eq!(built[0].series[0].points.len(), 2);
    }

    #[test]
    fn test_points_are_time_ordered_and_skip_absent() {
        let records = vec![
            reading(2, "2024-01-02T00:00:00", Some(12.0)),
            reading(3, "2024-01-03T00:00:00", None),
            reading(1, "2024-01-01T00:00:00", Some(10.0)),
        ];
        let chart = chart_for(MetricField::Pm25, &records).unwrap();
        let values: Vec<f64> = chart.series[0].points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 12.0]);
    }

    #[test]
    fn test_downsampling_caps_point_count() {
        let points: Vec<TimeSeriesPoint> = (0..400)
            .map(|i| TimeSeriesPoint::new(i64::from(i), f64::from(i)))
            .collect();
        let downsampled = downsample_points(points, MAX_POINTS_PER_SERIES);
        assert!(downsampled.len() <= MAX_POINTS_PER_SERIES);
        // Bucket averaging: the first bucket of [0, 1, 2] averages to 1.
        assert_eq!(downsampled[0].value, 1.0);
    }
}
