use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::PredictionError;

/// Errors returned from handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request body: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("request timed out")]
    Timeout,

    #[error("internal server error")]
    Internal(String),
}

/// Failure envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    /// Request failures are the caller's to fix; only middleware errors differ.
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Prediction(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Prediction(PredictionError::InputValidation(_)) => "InputValidation",
            ApiError::Prediction(PredictionError::DateParse { .. }) => "DateParse",
            ApiError::Prediction(PredictionError::OutOfForecastWindow { .. }) => "OutOfForecastWindow",
            ApiError::Prediction(PredictionError::Model { .. }) => "Model",
            ApiError::Timeout => "Timeout",
            ApiError::Internal(_) => "Internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::Prediction(PredictionError::Model { .. }) | ApiError::Timeout => {
                tracing::warn!(error = %self, kind = self.error_type(), "request failed");
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, kind = self.error_type(), "request failed");
            }
            _ => {
                tracing::debug!(error = %self, kind = self.error_type(), "client error");
            }
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_prediction_errors_are_bad_requests() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        let resp = ApiError::from(PredictionError::OutOfForecastWindow { date }).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        let message = json["error"].as_str().unwrap();
        assert!(message.starts_with("예보 가능한 날짜가 아닙니다."));
        assert!(message.contains("2026-12-01"));
    }

    #[test]
    fn test_model_failure_maps_to_bad_request() {
        let err = ApiError::from(PredictionError::Model {
            model_id: "lgbm".into(),
            message: "bad input".into(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_type(), "Model");
    }

    #[tokio::test]
    async fn test_internal_errors_hide_detail() {
        let resp = ApiError::Internal("service overloaded".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "internal server error");
    }
}
