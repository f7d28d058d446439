//! In-memory weather snapshot and per-date aggregation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::domain::UNFORECASTABLE_TEMP;

/// Forecast element category as published by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Display, EnumString)]
pub enum ForecastCategory {
    /// Hourly temperature (°C)
    #[strum(serialize = "TMP")]
    Temperature,
    /// Relative humidity (%)
    #[strum(serialize = "REH")]
    Humidity,
    #[strum(default)]
    Other(String),
}

/// One forecast value for a category at a forecast date/time.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastReading {
    pub category: ForecastCategory,
    pub forecast_date: NaiveDate,
    /// "HHMM" as published
    pub forecast_time: String,
    /// `None` when the feed sent an empty or non-numeric value
    pub value: Option<f64>,
}

/// Forecast batch the snapshot was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSlot {
    pub base_date: NaiveDate,
    /// Hour of the issue slot, 0-23
    pub base_hour: u32,
}

impl IssueSlot {
    /// `base_date` query value, `YYYYMMDD`.
    pub fn base_date_param(&self) -> String {
        self.base_date.format("%Y%m%d").to_string()
    }

    /// `base_time` query value, `HH00`.
    pub fn base_time_param(&self) -> String {
        format!("{:02}00", self.base_hour)
    }
}

/// Process-wide forecast readings, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct WeatherSnapshot {
    slot: Option<IssueSlot>,
    readings: Vec<ForecastReading>,
}

/// Two scalar weather signals for one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyWeatherAggregate {
    pub date: NaiveDate,
    pub min_temperature: f64,
    pub mean_humidity: f64,
}

impl WeatherSnapshot {
    pub fn new(slot: IssueSlot, readings: Vec<ForecastReading>) -> Self {
        Self {
            slot: Some(slot),
            readings,
        }
    }

    /// Snapshot used when the upstream feed could not be loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn slot(&self) -> Option<IssueSlot> {
        self.slot
    }

    pub fn readings(&self) -> &[ForecastReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Reduce the snapshot to minimum temperature and mean humidity for `date`.
    ///
    /// With no temperature reading the minimum is [`UNFORECASTABLE_TEMP`].
    /// With no humidity reading the divisor is forced to 1, so the mean is 0.
    pub fn aggregate(&self, date: NaiveDate) -> DailyWeatherAggregate {
        let mut min_temperature = UNFORECASTABLE_TEMP;
        let mut humidity_sum = 0.0;
        let mut humidity_count = 0usize;

        for reading in self.readings.iter().filter(|r| r.forecast_date == date) {
            match (&reading.category, reading.value) {
                (ForecastCategory::Temperature, Some(v)) if v < min_temperature => {
                    min_temperature = v;
                }
                (ForecastCategory::Humidity, Some(v)) => {
                    humidity_sum += v;
                    humidity_count += 1;
                }
                _ => {}
            }
        }

        DailyWeatherAggregate {
            date,
            min_temperature,
            mean_humidity: humidity_sum / humidity_count.max(1) as f64,
        }
    }

    /// Distinct forecast dates covered by temperature readings.
    pub fn covered_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .readings
            .iter()
            .filter(|r| r.category == ForecastCategory::Temperature)
            .map(|r| r.forecast_date)
            .collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn reading(category: &str, day: &str, time: &str, value: Option<f64>) -> ForecastReading {
        ForecastReading {
            category: ForecastCategory::from_str(category).unwrap(),
            forecast_date: date(day),
            forecast_time: time.to_string(),
            value,
        }
    }

    fn snapshot() -> WeatherSnapshot {
        let slot = IssueSlot {
            base_date: date("2026-10-19"),
            base_hour: 5,
        };
        WeatherSnapshot::new(
            slot,
            vec![
                reading("TMP", "2026-10-19", "0600", Some(9.0)),
                reading("TMP", "2026-10-19", "0900", Some(12.0)),
                reading("TMP", "2026-10-19", "1500", Some(18.0)),
                reading("REH", "2026-10-19", "0600", Some(80.0)),
                reading("REH", "2026-10-19", "0900", None),
                reading("REH", "2026-10-19", "1500", Some(50.0)),
                reading("TMP", "2026-10-20", "0600", Some(-2.0)),
                reading("POP", "2026-10-20", "0600", Some(30.0)),
            ],
        )
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(ForecastCategory::from_str("TMP").unwrap(), ForecastCategory::Temperature);
        assert_eq!(ForecastCategory::from_str("REH").unwrap(), ForecastCategory::Humidity);
        assert_eq!(
            ForecastCategory::from_str("SKY").unwrap(),
            ForecastCategory::Other("SKY".to_string())
        );
    }

    #[test]
    fn test_aggregate_empty_snapshot_degenerates() {
        let agg = WeatherSnapshot::empty().aggregate(date("2026-10-19"));
        assert_eq!(agg.min_temperature, 100.0);
        assert_eq!(agg.mean_humidity, 0.0);
    }

    #[test]
    fn test_aggregate_skips_empty_humidity_values() {
        let agg = snapshot().aggregate(date("2026-10-19"));
        assert_eq!(agg.min_temperature, 9.0);
        assert_eq!(agg.mean_humidity, 65.0);
    }

    #[test]
    fn test_aggregate_date_without_humidity() {
        let agg = snapshot().aggregate(date("2026-10-20"));
        assert_eq!(agg.min_temperature, -2.0);
        assert_eq!(agg.mean_humidity, 0.0);
    }

    #[test]
    fn test_aggregate_uncovered_date() {
        let agg = snapshot().aggregate(date("2026-10-29"));
        assert_eq!(agg.min_temperature, UNFORECASTABLE_TEMP);
    }

    #[test]
    fn test_slot_params() {
        let slot = IssueSlot {
            base_date: date("2026-01-02"),
            base_hour: 2,
        };
        assert_eq!(slot.base_date_param(), "20260102");
        assert_eq!(slot.base_time_param(), "0200");
    }

    #[test]
    fn test_covered_dates() {
        assert_eq!(
            snapshot().covered_dates(),
            vec![date("2026-10-19"), date("2026-10-20")]
        );
    }
}
