// HTTP gateway implementation against the measurement backend
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;

use crate::application::gateway::{FetchError, MeasurementGateway, MeasurementPage};
use crate::domain::measurement::{Measurement, MetricField, latest_of};
use crate::domain::query::QueryFilter;
use crate::domain::station::Station;
use crate::infrastructure::config::BackendSettings;
use crate::infrastructure::dto::{MeasurementDto, StationDto};

// Missing date bounds widen to the backend's accepted extremes, the same
// defaults the web client sends.
const OPEN_RANGE_START: &str = "2000-01-01";
const OPEN_RANGE_END: &str = "2100-12-31";

#[derive(Debug, Clone)]
pub struct HttpMeasurementGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMeasurementGateway {
    pub fn new(settings: &BackendSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn range_url(&self, filter: &QueryFilter) -> String {
        let date_from = filter
            .date_from
            .map(|d| d.to_string())
            .unwrap_or_else(|| OPEN_RANGE_START.to_string());
        let date_to = filter
            .date_to
            .map(|d| d.to_string())
            .unwrap_or_else(|| OPEN_RANGE_END.to_string());

        let mut url = format!(
            "{}/mediciones/rango?central={}&fechaInicio={}&fechaFin={}&page={}&size={}",
            self.base_url,
            urlencoding::encode(&filter.station),
            date_from,
            date_to,
            filter.page,
            filter.page_size,
        );

        // The backend filters server-side as well; the view engine re-applies
        // the same bounds to whatever page comes back.
        for (field, range) in filter.ranges.iter() {
            let param = wire_param(field);
            if let Some(min) = range.min {
                url.push_str(&format!("&{param}Min={min}"));
            }
            if let Some(max) = range.max {
                url.push_str(&format!("&{param}Max={max}"));
            }
        }
        url
    }

    fn recent_url(&self, station: &str, limit: usize) -> String {
        format!(
            "{}/mediciones/ultimas?central={}&limit={}",
            self.base_url,
            urlencoding::encode(station),
            limit,
        )
    }

    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_measurements(
        &self,
        url: &str,
        station: &str,
    ) -> Result<Vec<Measurement>, FetchError> {
        let response = self.get(url).await?;
        let dtos: Vec<MeasurementDto> = response
            .json()
            .await
            .map_err(|e| FetchError::Payload(e.to_string()))?;
        dtos.into_iter().map(|d| d.into_domain(station)).collect()
    }
}

fn wire_param(field: MetricField) -> &'static str {
    match field {
        MetricField::Temperature => "temperatura",
        MetricField::Humidity => "humedad",
        MetricField::Pm25 => "pm25",
        MetricField::Pm10 => "pm10",
    }
}

fn header_number<T: FromStr>(response: &Response, name: &str) -> Option<T> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
}

#[async_trait]
impl MeasurementGateway for HttpMeasurementGateway {
    async fn fetch_range(&self, filter: &QueryFilter) -> Result<MeasurementPage, FetchError> {
        let url = self.range_url(filter);
        tracing::debug!(%url, "issuing range query");

        let response = self.get(&url).await?;
        let total_pages: Option<u32> = header_number(&response, "X-Total-Pages");
        let total_elements: Option<u64> = header_number(&response, "X-Total-Elements");

        let dtos: Vec<MeasurementDto> = response
            .json()
            .await
            .map_err(|e| FetchError::Payload(e.to_string()))?;
        let records = dtos
            .into_iter()
            .map(|d| d.into_domain(&filter.station))
            .collect::<Result<Vec<_>, _>>()?;

        // Headers are the primary channel for the totals; fall back to the
        // page itself when a proxy strips them.
        Ok(MeasurementPage {
            total_elements: total_elements.unwrap_or(records.len() as u64),
            total_pages: total_pages.unwrap_or(1),
            records,
        })
    }

    async fn fetch_latest(&self, station: &str) -> Result<Option<Measurement>, FetchError> {
        let records = self.fetch_recent(station, 1).await?;
        Ok(latest_of(&records).cloned())
    }

    async fn fetch_recent(
        &self,
        station: &str,
        limit: usize,
    ) -> Result<Vec<Measurement>, FetchError> {
        self.get_measurements(&self.recent_url(station, limit), station)
            .await
    }

    async fn list_stations(&self) -> Result<Vec<Station>, FetchError> {
        let response = self.get(&format!("{}/centrales", self.base_url)).await?;
        let dtos: Vec<StationDto> = response
            .json()
            .await
            .map_err(|e| FetchError::Payload(e.to_string()))?;
        Ok(dtos.into_iter().map(StationDto::into_domain).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::MetricRange;

    fn gateway() -> HttpMeasurementGateway {
        HttpMeasurementGateway::new(&BackendSettings {
            base_url: "http://localhost:8080/api/".to_string(),
            timeout_secs: 10,
        })
        .unwrap()
    }

    #[test]
    fn test_range_url_defaults_and_encoding() {
        let filter = QueryFilter::for_station("Estacion LIA");
        let url = gateway().range_url(&filter);
        assert_eq!(
            url,
            "http://localhost:8080/api/mediciones/rango?central=Estacion%20LIA\
             &fechaInicio=2000-01-01&fechaFin=2100-12-31&page=0&size=10"
        );
    }

    #[test]
    fn test_range_url_includes_dates_and_bounds() {
        let mut filter = QueryFilter::for_station("A");
        filter.date_from = chrono::NaiveDate::from_ymd_opt(2024, 1, 1);
        filter.date_to = chrono::NaiveDate::from_ymd_opt(2024, 2, 1);
        filter.ranges.pm25 = MetricRange {
            min: Some(5.0),
            max: Some(25.0),
        };
        filter.ranges.temperature = MetricRange {
            min: None,
            max: Some(30.0),
        };

        let url = gateway().range_url(&filter);
        assert!(url.contains("fechaInicio=2024-01-01&fechaFin=2024-02-01"));
        assert!(url.contains("&temperaturaMax=30"));
        assert!(url.contains("&pm25Min=5&pm25Max=25"));
        assert!(!url.contains("temperaturaMin"));
    }

    #[test]
    fn test_recent_url() {
        assert_eq!(
            gateway().recent_url("Estacion_LIA_SantoTomas", 60),
            "http://localhost:8080/api/mediciones/ultimas?central=Estacion_LIA_SantoTomas&limit=60"
        );
    }
}
