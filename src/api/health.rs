use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::domain::SEOUL_DISTRICTS;
use crate::service::HealthReport;

/// GET /health
///
/// Always 200 while the process serves; model and snapshot availability are
/// reported in the body.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.service.health())
}

#[derive(Debug, Serialize)]
pub struct DistrictList {
    pub districts: &'static [&'static str],
}

/// GET /districts
pub async fn districts() -> Json<DistrictList> {
    Json(DistrictList {
        districts: &SEOUL_DISTRICTS,
    })
}
