//! Prediction service
//!
//! Turns a `/predict` request into a feature record, dispatches it and
//! formats the reply. All state is built at startup and never mutated.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::domain::{
    EnvironmentReadings, FeatureRecord, HolidayCalendar, Numeric, PredictionError,
    PredictionMode, PredictionResult, DEFAULT_DISTRICT,
};
use crate::forecast::{FeatureBuilder, WeatherSnapshot};
use crate::ml::{ModelRegistry, ModelSlot, PredictionDispatcher};

const HOLIDAY_DESCRIPTION: &str = "휴일 가정(수요 감소) 반영 완료";

fn default_district() -> String {
    DEFAULT_DISTRICT.to_string()
}

/// Body of `POST /predict`.
///
/// Numeric fields accept either JSON numbers or numeric strings; absent or
/// `null` fields take their defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub mode: PredictionMode,
    #[serde(default = "default_district")]
    pub gu: String,
    #[serde(default)]
    pub dong: String,
    pub region_code: Option<Numeric>,

    // env mode
    pub min_temp: Option<Numeric>,
    pub ground_temp: Option<Numeric>,
    pub humidity: Option<Numeric>,
    pub pressure: Option<Numeric>,
    pub sunshine: Option<Numeric>,
    pub is_holiday: Option<Numeric>,
    pub lag_1d: Option<Numeric>,
    pub lag_7d: Option<Numeric>,

    // date mode
    pub date: Option<String>,
}

impl PredictRequest {
    pub fn region_code(&self) -> Result<i64, PredictionError> {
        self.region_code
            .as_ref()
            .ok_or_else(|| PredictionError::validation("region_code is required"))?
            .as_region_code()
    }

    /// Entered readings with defaults applied.
    pub fn environment_readings(&self) -> Result<EnvironmentReadings, PredictionError> {
        let defaults = EnvironmentReadings::default();
        let number = |value: &Option<Numeric>, field: &str, default: f64| {
            value
                .as_ref()
                .map(|v| v.as_f64(field))
                .transpose()
                .map(|v| v.unwrap_or(default))
        };

        let readings = EnvironmentReadings {
            min_temp: number(&self.min_temp, "min_temp", defaults.min_temp)?,
            ground_temp: number(&self.ground_temp, "ground_temp", defaults.ground_temp)?,
            humidity: number(&self.humidity, "humidity", defaults.humidity)?,
            pressure: number(&self.pressure, "pressure", defaults.pressure)?,
            sunshine: number(&self.sunshine, "sunshine", defaults.sunshine)?,
            is_holiday: self
                .is_holiday
                .as_ref()
                .map(|v| v.as_i64("is_holiday"))
                .transpose()?
                .unwrap_or(defaults.is_holiday),
            lag_1d: number(&self.lag_1d, "lag_1d", defaults.lag_1d)?,
            lag_7d: number(&self.lag_7d, "lag_7d", defaults.lag_7d)?,
        };
        readings.validate()?;
        Ok(readings)
    }
}

/// Successful `/predict` reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: i64,
    pub description: String,
    pub tag: &'static str,
    pub gu: String,
    pub dong: String,
    pub region_code: i64,
    pub mode: PredictionMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub models: ModelAvailability,
    pub snapshot: SnapshotSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAvailability {
    pub forecast_model: bool,
    pub lgbm_model: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub readings: usize,
    pub base_date: Option<String>,
    pub base_time: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PredictionService {
    builder: FeatureBuilder,
    dispatcher: PredictionDispatcher,
    timezone: Tz,
}

impl PredictionService {
    pub fn new(
        snapshot: Arc<WeatherSnapshot>,
        calendar: Arc<HolidayCalendar>,
        registry: Arc<ModelRegistry>,
        timezone: Tz,
    ) -> Self {
        Self {
            builder: FeatureBuilder::new(snapshot, calendar),
            dispatcher: PredictionDispatcher::new(registry),
            timezone,
        }
    }

    pub fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, PredictionError> {
        self.predict_with_rng(request, &mut rand::thread_rng())
    }

    pub fn predict_with_rng<R: Rng + ?Sized>(
        &self,
        request: &PredictRequest,
        rng: &mut R,
    ) -> Result<PredictResponse, PredictionError> {
        let region_code = request.region_code()?;
        let gu = request.gu.as_str();
        let dong = request.dong.as_str();

        let (record, description) = match request.mode {
            PredictionMode::Env => {
                let readings = request.environment_readings()?;
                let features = self.builder.build_environment_features(region_code, dong, &readings);
                let description = if features.is_holiday {
                    HOLIDAY_DESCRIPTION.to_string()
                } else {
                    format!("{gu} {dong} 환경 변수 시뮬레이션 결과")
                };
                (FeatureRecord::from(features), description)
            }
            PredictionMode::Date => {
                let date = match &request.date {
                    Some(date) => date.clone(),
                    None => self.today().format("%Y-%m-%d").to_string(),
                };
                let features = self.builder.build_date_features(region_code, dong, &date)?;
                (
                    FeatureRecord::from(features),
                    format!("{gu} {dong} 날짜별 평균 기상 데이터 분석 완료"),
                )
            }
        };

        let value = self.dispatcher.predict_with_rng(&record, rng)?;
        let result = PredictionResult::new(value, request.mode, description);

        info!(
            mode = %result.mode,
            region_code,
            gu,
            dong,
            prediction = result.whole_value(),
            "prediction served"
        );

        Ok(PredictResponse {
            success: true,
            prediction: result.whole_value(),
            description: result.description,
            tag: result.tag,
            gu: request.gu.clone(),
            dong: request.dong.clone(),
            region_code,
            mode: result.mode,
        })
    }

    pub fn health(&self) -> HealthReport {
        let registry = self.dispatcher.registry();
        let snapshot = self.builder.snapshot();
        HealthReport {
            status: "healthy",
            models: ModelAvailability {
                forecast_model: registry.is_available(ModelSlot::Forecast),
                lgbm_model: registry.is_available(ModelSlot::Lgbm),
            },
            snapshot: SnapshotSummary {
                readings: snapshot.len(),
                base_date: snapshot.slot().map(|s| s.base_date_param()),
                base_time: snapshot.slot().map(|s| s.base_time_param()),
            },
        }
    }

    /// Calendar date in the configured time zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}
