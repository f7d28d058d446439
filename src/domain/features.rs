//! Mode-specific feature records handed to the prediction dispatcher.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::types::PredictionMode;

/// Hand-entered environmental readings, after request defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct EnvironmentReadings {
    pub min_temp: f64,
    pub ground_temp: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub sunshine: f64,
    /// 0 = working day, 1 = holiday
    #[validate(range(min = 0, max = 1, message = "is_holiday must be 0 or 1"))]
    pub is_holiday: i64,
    pub lag_1d: f64,
    pub lag_7d: f64,
}

impl Default for EnvironmentReadings {
    fn default() -> Self {
        Self {
            min_temp: 20.0,
            ground_temp: 18.0,
            humidity: 60.0,
            pressure: 1013.0,
            sunshine: 14.0,
            is_holiday: 0,
            lag_1d: 0.0,
            lag_7d: 0.0,
        }
    }
}

/// Features for the environment-driven model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentFeatures {
    pub region_code: i64,
    pub min_temp: f64,
    pub ground_temp: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub sunshine_hours: f64,
    pub is_holiday: bool,
    pub lag_1d: f64,
    pub lag_7d: f64,
}

/// Placeholder minimum temperature meaning "no forecast for this date".
pub const UNFORECASTABLE_TEMP: f64 = 100.0;

/// Features for the date-driven forecast model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateFeatures {
    pub region_code: i64,
    /// Minimum forecast temperature; [`UNFORECASTABLE_TEMP`] when the snapshot has no reading
    pub min_temp: f64,
    pub humidity: f64,
    pub is_holiday: bool,
    pub target_date: NaiveDate,
}

impl DateFeatures {
    /// False when the snapshot had no temperature for the target date.
    pub fn is_forecastable(&self) -> bool {
        self.min_temp != UNFORECASTABLE_TEMP
    }
}

/// Exactly one populated feature set per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FeatureRecord {
    Environment(EnvironmentFeatures),
    Date(DateFeatures),
}

impl FeatureRecord {
    pub fn mode(&self) -> PredictionMode {
        match self {
            FeatureRecord::Environment(_) => PredictionMode::Env,
            FeatureRecord::Date(_) => PredictionMode::Date,
        }
    }

    pub fn region_code(&self) -> i64 {
        match self {
            FeatureRecord::Environment(f) => f.region_code,
            FeatureRecord::Date(f) => f.region_code,
        }
    }
}

impl From<EnvironmentFeatures> for FeatureRecord {
    fn from(features: EnvironmentFeatures) -> Self {
        FeatureRecord::Environment(features)
    }
}

impl From<DateFeatures> for FeatureRecord {
    fn from(features: DateFeatures) -> Self {
        FeatureRecord::Date(features)
    }
}
