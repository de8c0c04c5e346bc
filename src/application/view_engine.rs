// View engine - pure derivation of the visible rows from a store snapshot
// and the active query filter
use std::cmp::Ordering;

use crate::domain::measurement::Measurement;
use crate::domain::query::{QueryFilter, SortDirection, SortField};

/// Derive the rows to display: apply the numeric range filters, sort by the
/// selected field, and slice out the requested page. No side effects;
/// identical `(snapshot, filter)` input yields identical output.
pub fn view(snapshot: &[Measurement], filter: &QueryFilter) -> Vec<Measurement> {
    let mut rows: Vec<Measurement> = snapshot
        .iter()
        .filter(|m| passes_ranges(m, filter))
        .cloned()
        .collect();

    sort_rows(&mut rows, filter.sort_field, filter.sort_direction);
    paginate(rows, filter.page, filter.page_size)
}

/// A record with an absent value for a bounded field is dropped by that
/// field's filter, the same as an out-of-range one.
fn passes_ranges(record: &Measurement, filter: &QueryFilter) -> bool {
    filter.ranges.iter().all(|(field, range)| {
        !range.is_active()
            || record
                .metric(field)
                .is_some_and(|value| range.contains(value))
    })
}

fn sort_rows(rows: &mut [Measurement], field: SortField, direction: SortDirection) {
    // Stable sort; descending negates the ascending key comparison, so ties
    // keep their input order in either direction.
    rows.sort_by(|a, b| {
        let ordering = compare_by(a, b, field);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_by(a: &Measurement, b: &Measurement, field: SortField) -> Ordering {
    match field {
        SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortField::Metric(metric) => compare_metric(a.metric(metric), b.metric(metric)),
    }
}

/// Absent values order before any present value.
fn compare_metric(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.total_cmp(&y),
    }
}

fn paginate(rows: Vec<Measurement>, page: usize, page_size: usize) -> Vec<Measurement> {
    let start = page.saturating_mul(page_size);
    // Past the filtered length is an empty page, not an error.
    rows.into_iter().skip(start).take(page_size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    use crate::domain::measurement::MetricField;
    use crate::domain::query::MetricRange;

    fn reading(id: i64, ts: &str, pm25: Option<f64>) -> Measurement {
        Measurement {
            id,
            station: "A".to_string(),
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S")
                .unwrap()
                .and_utc(),
            temperature: Some(20.0),
            humidity: Some(50.0),
            pm25,
            pm10: None,
        }
    }

    fn snapshot() -> Vec<Measurement> {
        vec![
            reading(1, "2024-01-01T00:00:00", Some(10.0)),
            reading(2, "2024-01-02T00:00:00", Some(30.0)),
        ]
    }

    fn base_filter() -> QueryFilter {
        let mut filter = QueryFilter::for_station("A");
        filter.sort_field = SortField::Timestamp;
        filter.sort_direction = SortDirection::Desc;
        filter.page = 0;
        filter.page_size = 10;
        filter
    }

    #[test]
    fn test_descending_timestamp_order() {
        let rows = view(&snapshot(), &base_filter());
        let ids: Vec<i64> = rows.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_pm25_max_filter_excludes_out_of_range() {
        let mut filter = base_filter();
        filter.ranges.pm25 = MetricRange {
            min: None,
            max: Some(25.0),
        };
        let rows = view(&snapshot(), &filter);
        let ids: Vec<i64> = rows.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_absent_value_is_excluded_by_any_range() {
        let records = vec![
            reading(1, "2024-01-01T00:00:00", None),
            reading(2, "2024-01-02T00:00:00", Some(12.0)),
        ];
        let mut filter = base_filter();
        filter.ranges.pm25 = MetricRange {
            min: Some(0.0),
            max: None,
        };
        let rows = view(&records, &filter);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 2);
    }

    #[test]
    fn test_view_is_pure() {
        let records = snapshot();
        let filter = base_filter();
        assert_eq!(view(&records, &filter), view(&records, &filter));
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys_in_both_directions() {
        // Same pm25 for all three; input order must survive sorting.
        let records = vec![
            reading(10, "2024-01-03T00:00:00", Some(15.0)),
            reading(11, "2024-01-01T00:00:00", Some(15.0)),
            reading(12, "2024-01-02T00:00:00", Some(15.0)),
        ];
        let mut filter = base_filter();
        filter.sort_field = SortField::Metric(MetricField::Pm25);

        filter.sort_direction = SortDirection::Asc;
        let asc: Vec<i64> = view(&records, &filter).iter().map(|m| m.id).collect();
        assert_eq!(asc, vec![10, 11, 12]);

        filter.sort_direction = SortDirection::Desc;
        let desc: Vec<i64> = view(&records, &filter).iter().map(|m| m.id).collect();
        assert_eq!(desc, vec![10, 11, 12]);
    }

    #[test]
    fn test_absent_values_sort_before_present_ones() {
        let records = vec![
            reading(1, "2024-01-01T00:00:00", Some(5.0)),
            reading(2, "2024-01-02T00:00:00", None),
        ];
        let mut filter = base_filter();
        filter.sort_field = SortField::Metric(MetricField::Pm25);
        filter.sort_direction = SortDirection::Asc;

        let ids: Vec<i64> = view(&records, &filter).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_pagination_partitions_without_gaps_or_overlaps() {
        let records: Vec<Measurement> = (0..7)
            .map(|i| reading(i, "2024-01-01T00:00:00", Some(i as f64)))
            .collect();
        let mut filter = base_filter();
        filter.sort_direction = SortDirection::Asc;
        filter.page_size = 3;

        let mut seen = Vec::new();
        for page in 0..3 {
            filter.page = page;
            let rows = view(&records, &filter);
            assert!(rows.len() <= filter.page_size);
            seen.extend(rows.iter().map(|m| m.id));
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..7).collect::<Vec<i64>>());
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let mut filter = base_filter();
        filter.page = 5;
        assert!(view(&snapshot(), &filter).is_empty());
    }
}
