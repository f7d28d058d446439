use chrono::NaiveDate;
use thiserror::Error;

/// Failures of a single prediction request.
///
/// A missing model is not represented here: it routes to the fallback
/// heuristic instead of failing the request.
#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("invalid request: {0}")]
    InputValidation(String),

    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    DateParse { input: String },

    #[error("예보 가능한 날짜가 아닙니다. (오늘로부터 4일이내의 날짜만 예보가 가능합니다) [{date}]")]
    OutOfForecastWindow { date: NaiveDate },

    #[error("model '{model_id}' failed: {message}")]
    Model { model_id: String, message: String },
}

impl PredictionError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::InputValidation(message.into())
    }
}

impl From<validator::ValidationErrors> for PredictionError {
    fn from(errors: validator::ValidationErrors) -> Self {
        PredictionError::InputValidation(errors.to_string())
    }
}
