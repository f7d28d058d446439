//! Static input schemas for the two model slots
//!
//! Field names and order match the columns the models were trained on.
//! Categorical fields are bound as their integer codes.

use thiserror::Error;

use super::{FeatureVector, ModelMetadata};
use crate::domain::{DateFeatures, EnvironmentFeatures};

pub const REGION_CODE: &str = "지역코드";
pub const MIN_TEMP: &str = "최저기온(°C)";
pub const GROUND_TEMP: &str = "0.5m 지중온도(°C)";
pub const VAPOR_PRESSURE: &str = "평균 증기압(hPa)";
pub const SUNSHINE: &str = "가조시간(hr)";
pub const HUMIDITY: &str = "평균 상대습도(%)";
pub const LAG_1D: &str = "lag_1d";
pub const LAG_7D: &str = "lag_7d";
pub const IS_HOLIDAY: &str = "휴일여부";

/// Ordered field list plus categorical field set of one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSchema {
    pub fields: &'static [&'static str],
    pub categorical: &'static [&'static str],
}

/// Environment-driven demand model.
pub const ENVIRONMENT_SCHEMA: ModelSchema = ModelSchema {
    fields: &[
        REGION_CODE,
        MIN_TEMP,
        GROUND_TEMP,
        VAPOR_PRESSURE,
        SUNSHINE,
        HUMIDITY,
        LAG_1D,
        LAG_7D,
        IS_HOLIDAY,
    ],
    categorical: &[REGION_CODE],
};

/// Date-driven forecast model.
pub const DATE_SCHEMA: ModelSchema = ModelSchema {
    fields: &[REGION_CODE, MIN_TEMP, HUMIDITY, IS_HOLIDAY],
    categorical: &[REGION_CODE, IS_HOLIDAY],
};

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("model expects fields {actual:?}, schema defines {expected:?}")]
    FieldMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("model treats {actual:?} as categorical, schema defines {expected:?}")]
    CategoricalMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl ModelSchema {
    /// Reject artifacts whose declared inputs differ from this schema.
    pub fn validate(&self, metadata: &ModelMetadata) -> Result<(), SchemaError> {
        if metadata.feature_names.iter().map(String::as_str).ne(self.fields.iter().copied()) {
            return Err(SchemaError::FieldMismatch {
                expected: to_owned(self.fields),
                actual: metadata.feature_names.clone(),
            });
        }

        let mut expected = to_owned(self.categorical);
        let mut actual = metadata.categorical_features.clone();
        expected.sort();
        actual.sort();
        if expected != actual {
            return Err(SchemaError::CategoricalMismatch { expected, actual });
        }
        Ok(())
    }

    pub fn is_categorical(&self, field: &str) -> bool {
        self.categorical.contains(&field)
    }

    fn vector(&self, mut values: Vec<f64>) -> FeatureVector {
        debug_assert_eq!(values.len(), self.fields.len());
        for (value, field) in values.iter_mut().zip(self.fields) {
            if self.is_categorical(field) {
                *value = value.trunc();
            }
        }
        FeatureVector {
            features: values,
            feature_names: to_owned(self.fields),
        }
    }
}

fn to_owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl EnvironmentFeatures {
    /// Bind to [`ENVIRONMENT_SCHEMA`] order.
    pub fn to_model_input(&self) -> FeatureVector {
        ENVIRONMENT_SCHEMA.vector(vec![
            self.region_code as f64,
            self.min_temp,
            self.ground_temp,
            self.pressure,
            self.sunshine_hours,
            self.humidity,
            self.lag_1d,
            self.lag_7d,
            flag(self.is_holiday),
        ])
    }
}

impl DateFeatures {
    /// Bind to [`DATE_SCHEMA`] order.
    pub fn to_model_input(&self) -> FeatureVector {
        DATE_SCHEMA.vector(vec![
            self.region_code as f64,
            self.min_temp,
            self.humidity,
            flag(self.is_holiday),
        ])
    }
}
