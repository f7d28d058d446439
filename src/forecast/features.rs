//! Feature construction for the two prediction modes
//!
//! Environment-mode features are a pure mapping of the entered readings.
//! Date-mode features resolve weather from the startup snapshot and the
//! holiday flag from the calendar.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use super::snapshot::WeatherSnapshot;
use crate::domain::{
    DateFeatures, EnvironmentFeatures, EnvironmentReadings, HolidayCalendar, PredictionError,
};

/// Builds mode-specific feature records from request data.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    snapshot: Arc<WeatherSnapshot>,
    calendar: Arc<HolidayCalendar>,
}

impl FeatureBuilder {
    pub fn new(snapshot: Arc<WeatherSnapshot>, calendar: Arc<HolidayCalendar>) -> Self {
        Self { snapshot, calendar }
    }

    pub fn snapshot(&self) -> &WeatherSnapshot {
        &self.snapshot
    }

    /// Map entered readings onto environment-model features.
    pub fn build_environment_features(
        &self,
        region_code: i64,
        dong: &str,
        raw: &EnvironmentReadings,
    ) -> EnvironmentFeatures {
        debug!(region_code, dong, "building environment features");
        EnvironmentFeatures {
            region_code,
            min_temp: raw.min_temp,
            ground_temp: raw.ground_temp,
            humidity: raw.humidity,
            pressure: raw.pressure,
            sunshine_hours: raw.sunshine,
            is_holiday: raw.is_holiday == 1,
            lag_1d: raw.lag_1d,
            lag_7d: raw.lag_7d,
        }
    }

    /// Resolve a `YYYY-MM-DD` target date into date-model features.
    pub fn build_date_features(
        &self,
        region_code: i64,
        dong: &str,
        target_date: &str,
    ) -> Result<DateFeatures, PredictionError> {
        let date = parse_target_date(target_date)?;
        let weather = self.snapshot.aggregate(date);
        let is_holiday = self.calendar.is_holiday(date);

        debug!(
            region_code,
            dong,
            %date,
            min_temp = weather.min_temperature,
            humidity = weather.mean_humidity,
            is_holiday,
            "building date features"
        );

        Ok(DateFeatures {
            region_code,
            min_temp: weather.min_temperature,
            humidity: weather.mean_humidity,
            is_holiday,
            target_date: date,
        })
    }
}

/// Strict ISO calendar date.
pub fn parse_target_date(input: &str) -> Result<NaiveDate, PredictionError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| PredictionError::DateParse {
        input: input.to_string(),
    })
}
