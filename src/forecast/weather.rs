//! Short-range weather forecast integration (KMA village forecast)
//!
//! The forecast feed is fetched once at startup and held as a
//! [`WeatherSnapshot`] for the lifetime of the process.

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, Timelike};
use reqwest::Client;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::snapshot::{ForecastCategory, ForecastReading, IssueSlot, WeatherSnapshot};
use crate::config::WeatherConfig;

/// Result code the provider uses for a successful call.
const RESULT_OK: &str = "00";

/// Why a snapshot could not be loaded.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("forecast request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("forecast API returned HTTP {status}")]
    Status { status: reqwest::StatusCode },

    #[error("forecast API reported {code}: {message}")]
    Upstream { code: String, message: String },

    #[error("forecast response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("forecast response contained no items")]
    Empty,
}

/// Grid cell of the forecast (KMA Lambert conformal grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPoint {
    pub x: u32,
    pub y: u32,
}

/// Reference issue slot for the forecast batch that should be published at `now`.
///
/// Batches are issued every three hours from 02:00. Before 03:00 the previous
/// day's date is used, and within the first quarter hour the preceding slot
/// is chosen because the current one may not be published yet.
pub fn issue_slot(now: NaiveDateTime) -> IssueSlot {
    let reference = if now.hour() < 3 {
        now - ChronoDuration::days(1)
    } else {
        now
    };

    let mut hour = now.hour() as i32;
    if now.minute() <= 15 {
        hour -= 1;
    }
    hour = (hour - 2).div_euclid(3) * 3 + 2;
    if hour < 0 {
        hour += 24;
    }

    IssueSlot {
        base_date: reference.date(),
        base_hour: hour as u32,
    }
}

/// Client for the village forecast endpoint.
pub struct KmaForecastClient {
    client: Client,
    base_url: String,
    service_key: String,
    grid: GridPoint,
    num_of_rows: u32,
}

impl KmaForecastClient {
    pub fn new(cfg: &WeatherConfig, service_key: String) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.clone(),
            service_key,
            grid: GridPoint {
                x: cfg.grid_x,
                y: cfg.grid_y,
            },
            num_of_rows: cfg.num_of_rows,
        })
    }

    /// Fetch the batch for `slot` and parse it into a snapshot.
    pub async fn fetch_snapshot(&self, slot: IssueSlot) -> Result<WeatherSnapshot, WeatherError> {
        let base_date = slot.base_date_param();
        let base_time = slot.base_time_param();
        debug!(
            url = %self.base_url,
            %base_date,
            %base_time,
            nx = self.grid.x,
            ny = self.grid.y,
            "fetching village forecast"
        );

        let num_of_rows = self.num_of_rows.to_string();
        let nx = self.grid.x.to_string();
        let ny = self.grid.y.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("serviceKey", self.service_key.as_str()),
                ("pageNo", "1"),
                ("numOfRows", num_of_rows.as_str()),
                ("dataType", "JSON"),
                ("base_date", base_date.as_str()),
                ("base_time", base_time.as_str()),
                ("nx", nx.as_str()),
                ("ny", ny.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status { status });
        }

        let body = response.text().await?;
        let snapshot = parse_forecast(slot, &body)?;

        info!(
            readings = snapshot.len(),
            days = snapshot.covered_dates().len(),
            %base_date,
            %base_time,
            "loaded village forecast snapshot"
        );
        Ok(snapshot)
    }

    /// Fetch the batch for the issue slot current at `now`.
    pub async fn load_snapshot(&self, now: NaiveDateTime) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch_snapshot(issue_slot(now)).await
    }
}

/// Parse a village forecast JSON body.
pub fn parse_forecast(slot: IssueSlot, body: &str) -> Result<WeatherSnapshot, WeatherError> {
    let envelope: KmaEnvelope = serde_json::from_str(body)?;
    let header = envelope.response.header;
    if header.result_code != RESULT_OK {
        return Err(WeatherError::Upstream {
            code: header.result_code,
            message: header.result_msg,
        });
    }

    let items = envelope
        .response
        .body
        .map(|b| b.items.item)
        .unwrap_or_default();

    let mut readings = Vec::with_capacity(items.len());
    for item in items {
        let Ok(forecast_date) = NaiveDate::parse_from_str(&item.fcst_date, "%Y%m%d") else {
            warn!(fcst_date = %item.fcst_date, "skipping forecast item with invalid date");
            continue;
        };
        let category = ForecastCategory::from_str(&item.category)
            .unwrap_or(ForecastCategory::Other(item.category.clone()));
        readings.push(ForecastReading {
            category,
            forecast_date,
            forecast_time: item.fcst_time,
            value: item.fcst_value.trim().parse::<f64>().ok(),
        });
    }

    if readings.is_empty() {
        return Err(WeatherError::Empty);
    }
    Ok(WeatherSnapshot::new(slot, readings))
}

// Village forecast response structures
#[derive(Debug, Deserialize)]
struct KmaEnvelope {
    response: KmaResponse,
}

#[derive(Debug, Deserialize)]
struct KmaResponse {
    header: KmaHeader,
    body: Option<KmaBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KmaHeader {
    result_code: String,
    #[serde(default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct KmaBody {
    items: KmaItems,
}

#[derive(Debug, Deserialize)]
struct KmaItems {
    #[serde(default)]
    item: Vec<KmaItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KmaItem {
    category: String,
    fcst_date: String,
    #[serde(default)]
    fcst_time: String,
    #[serde(default, deserialize_with = "value_as_string")]
    fcst_value: String,
}

/// `fcstValue` is a string in practice, but tolerate bare numbers.
fn value_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Ok(String::new()),
    }
}
