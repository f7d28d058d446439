//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use tower::util::ServiceExt;

use demand_forecast_server::api::{router, AppState};
use demand_forecast_server::config::{ModelsConfig, ServerConfig};
use demand_forecast_server::domain::HolidayCalendar;
use demand_forecast_server::forecast::{parse_forecast, IssueSlot, WeatherSnapshot};
use demand_forecast_server::ml::ModelRegistry;
use demand_forecast_server::service::PredictionService;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Registry with both fixture models loaded.
pub fn fixture_models() -> ModelRegistry {
    ModelRegistry::load_all(&ModelsConfig {
        lgbm_path: Some(fixture("lgbm_model.json")),
        forecast_path: Some(fixture("forecast_model.json")),
    })
}

/// Registry whose artifacts cannot be read.
pub fn missing_models() -> ModelRegistry {
    ModelRegistry::load_all(&ModelsConfig {
        lgbm_path: Some(fixture("missing_lgbm.json")),
        forecast_path: Some(fixture("missing_forecast.json")),
    })
}

pub fn issue_slot() -> IssueSlot {
    IssueSlot {
        base_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        base_hour: 5,
    }
}

/// Provider response covering 2026-10-20 (min 6°C, humidity 70%) and
/// 2026-10-21 (min 2°C, humidity 50%).
pub fn forecast_body() -> String {
    let item = |category: &str, date: &str, time: &str, value: &str| {
        format!(
            r#"{{"baseDate":"20261019","baseTime":"0500","category":"{category}","fcstDate":"{date}","fcstTime":"{time}","fcstValue":"{value}","nx":60,"ny":127}}"#
        )
    };
    let items = [
        item("TMP", "20261020", "0600", "6"),
        item("TMP", "20261020", "1500", "17"),
        item("REH", "20261020", "0600", "80"),
        item("REH", "20261020", "1500", "60"),
        item("SKY", "20261020", "0600", "1"),
        item("TMP", "20261021", "0600", "2"),
        item("REH", "20261021", "0600", "50"),
    ]
    .join(",");
    format!(
        r#"{{"response":{{"header":{{"resultCode":"00","resultMsg":"NORMAL_SERVICE"}},"body":{{"dataType":"JSON","items":{{"item":[{items}]}},"pageNo":1,"numOfRows":1200,"totalCount":7}}}}}}"#
    )
}

pub fn forecast_snapshot() -> WeatherSnapshot {
    parse_forecast(issue_slot(), &forecast_body()).unwrap()
}

pub fn app(snapshot: WeatherSnapshot, registry: ModelRegistry) -> Router {
    let service = PredictionService::new(
        Arc::new(snapshot),
        Arc::new(HolidayCalendar::new()),
        Arc::new(registry),
        chrono_tz::Asia::Seoul,
    );
    router(AppState::new(service), &ServerConfig::default())
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

pub async fn post_json(app: Router, uri: &str, body: impl Into<String>) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap();
    send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}
