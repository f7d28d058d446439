//! Prediction endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::{error::ApiError, AppState};
use crate::service::{PredictRequest, PredictResponse};

/// POST /predict
///
/// Body rejections are folded into the same 400 envelope as prediction
/// failures.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state.service.predict(&request)?;
    Ok(Json(response))
}
