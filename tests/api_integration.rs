//! HTTP-level tests for the prediction API.

mod common;

use axum::http::StatusCode;
use demand_forecast_server::forecast::WeatherSnapshot;
use demand_forecast_server::ml::ModelRegistry;
use serde_json::json;

use common::{app, fixture_models, forecast_snapshot, get_json, missing_models, post_json};

#[tokio::test]
async fn health_reports_missing_models_and_predict_still_answers() {
    let router = app(WeatherSnapshot::empty(), missing_models());

    let (status, body) = get_json(router.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["models"]["forecastModel"], false);
    assert_eq!(body["models"]["lgbmModel"], false);
    assert_eq!(body["snapshot"]["readings"], 0);
    assert!(body["snapshot"]["base_date"].is_null());

    let (status, body) = post_json(router.clone(), "/predict", json!({"region_code": 11680}).to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["prediction"].as_i64().unwrap() >= 0);

    let (status, body) = post_json(router, "/predict", json!({"mode": "date", "region_code": 11680, "date": "2026-10-20"}).to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tag"], "DATE-BASED AI");
}

#[tokio::test]
async fn health_reports_loaded_models_and_snapshot() {
    let (status, body) = get_json(app(forecast_snapshot(), fixture_models()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"]["forecastModel"], true);
    assert_eq!(body["models"]["lgbmModel"], true);
    assert_eq!(body["snapshot"]["readings"], 7);
    assert_eq!(body["snapshot"]["base_date"], "20261019");
    assert_eq!(body["snapshot"]["base_time"], "0500");
}

#[tokio::test]
async fn env_request_echoes_identity() {
    let router = app(WeatherSnapshot::empty(), fixture_models());
    let request = json!({
        "mode": "env",
        "gu": "강남구",
        "dong": "역삼동",
        "region_code": "11680",
        "min_temp": 3,
        "is_holiday": 0
    });

    let (status, body) = post_json(router, "/predict", request.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            // cold (68000) + working day (0) + listed region (1500)
            "prediction": 69500,
            "description": "강남구 역삼동 환경 변수 시뮬레이션 결과",
            "tag": "FEATURE-DRIVEN AI",
            "gu": "강남구",
            "dong": "역삼동",
            "region_code": 11680,
            "mode": "env"
        })
    );
}

#[tokio::test]
async fn env_holiday_request_uses_holiday_description() {
    let router = app(WeatherSnapshot::empty(), fixture_models());
    let request = json!({"gu": "종로구", "region_code": 11110, "is_holiday": "1"});

    let (status, body) = post_json(router, "/predict", request.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    // warm default (61000) + holiday (-9000)
    assert_eq!(body["prediction"], 52000);
    assert_eq!(body["description"], "휴일 가정(수요 감소) 반영 완료");
}

#[tokio::test]
async fn date_request_resolves_forecast_weather() {
    let router = app(forecast_snapshot(), fixture_models());
    let request = json!({"mode": "date", "gu": "강남구", "dong": "역삼동", "region_code": 11680, "date": "2026-10-20"});

    let (status, body) = post_json(router, "/predict", request.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    // 62000 - 400 * 6 + 20 * 70
    assert_eq!(body["prediction"], 61000);
    assert_eq!(body["description"], "강남구 역삼동 날짜별 평균 기상 데이터 분석 완료");
    assert_eq!(body["mode"], "date");
}

#[tokio::test]
async fn date_outside_forecast_window_is_rejected() {
    let router = app(forecast_snapshot(), fixture_models());
    let request = json!({"mode": "date", "region_code": 11680, "date": "2026-11-30"});

    let (status, body) = post_json(router, "/predict", request.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("예보 가능한 날짜가 아닙니다."));
    assert!(message.contains("2026-11-30"));
}

#[tokio::test]
async fn invalid_requests_get_error_envelope() {
    let router = app(WeatherSnapshot::empty(), ModelRegistry::empty());

    let cases = [
        "{not json".to_string(),
        json!({"gu": "강남구"}).to_string(),
        json!({"region_code": "gangnam"}).to_string(),
        json!({"region_code": 11680, "mode": "weekly"}).to_string(),
        json!({"region_code": 11680, "is_holiday": 3}).to_string(),
        json!({"region_code": 11680, "mode": "date", "date": "10/20/2026"}).to_string(),
    ];

    for case in cases {
        let (status, body) = post_json(router.clone(), "/predict", case.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{case}");
        assert_eq!(body["success"], false, "{case}");
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{case}");
    }
}

#[tokio::test]
async fn districts_lists_all_seoul_gu() {
    let (status, body) = get_json(app(WeatherSnapshot::empty(), ModelRegistry::empty()), "/districts").await;
    assert_eq!(status, StatusCode::OK);
    let districts = body["districts"].as_array().unwrap();
    assert_eq!(districts.len(), 25);
    assert!(districts.contains(&json!("강남구")));
}
