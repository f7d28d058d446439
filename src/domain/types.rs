use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::error::PredictionError;

/// Request mode: hand-entered readings or a forecast-resolved date.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PredictionMode {
    #[default]
    Env,
    Date,
}

impl PredictionMode {
    /// Label reported with each prediction.
    pub fn tag(&self) -> &'static str {
        match self {
            PredictionMode::Env => "FEATURE-DRIVEN AI",
            PredictionMode::Date => "DATE-BASED AI",
        }
    }
}

/// Scalar demand estimate with its presentation fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Never negative.
    pub value: f64,
    pub mode: PredictionMode,
    pub tag: &'static str,
    pub description: String,
}

impl PredictionResult {
    pub fn new(value: f64, mode: PredictionMode, description: String) -> Self {
        Self {
            value: value.max(0.0),
            mode,
            tag: mode.tag(),
            description,
        }
    }

    /// Whole-unit value as reported over the API (truncated).
    pub fn whole_value(&self) -> i64 {
        self.value.trunc() as i64
    }
}

/// A numeric request field that may arrive as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(serde_json::Number),
    Text(String),
}

impl Numeric {
    pub fn as_f64(&self, field: &str) -> Result<f64, PredictionError> {
        let value = match self {
            Numeric::Number(n) => n.as_f64(),
            Numeric::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value
            .filter(|v| v.is_finite())
            .ok_or_else(|| PredictionError::validation(format!("{field} must be a number")))
    }

    pub fn as_i64(&self, field: &str) -> Result<i64, PredictionError> {
        match self {
            Numeric::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
                .ok_or_else(|| PredictionError::validation(format!("{field} must be an integer"))),
            Numeric::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| PredictionError::validation(format!("{field} must be an integer"))),
        }
    }

    /// Region codes coerce an empty string to 0; any other text must parse.
    pub fn as_region_code(&self) -> Result<i64, PredictionError> {
        match self {
            Numeric::Text(s) if s.trim().is_empty() => Ok(0),
            other => other.as_i64("region_code"),
        }
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Number(value.into())
    }
}

/// Seoul's 25 autonomous districts (gu).
pub const SEOUL_DISTRICTS: [&str; 25] = [
    "강남구", "강동구", "강북구", "강서구", "관악구", "광진구", "구로구", "금천구",
    "노원구", "도봉구", "동대문구", "동작구", "마포구", "서대문구", "서초구", "성동구",
    "성북구", "송파구", "양천구", "영등포구", "용산구", "은평구", "종로구", "중구", "중랑구",
];

/// District assumed when a request names none.
pub const DEFAULT_DISTRICT: &str = "강남구";
