use anyhow::{Context, Result};
use chrono::Utc;
use demand_forecast_server::{
    api::{self, AppState},
    config::{self, Config, WeatherConfig},
    domain::HolidayCalendar,
    forecast::{KmaForecastClient, WeatherSnapshot},
    ml::ModelRegistry,
    service::PredictionService,
    telemetry,
};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing()?;

    let cfg = Config::load().context("Failed to load configuration")?;
    let tz = cfg.weather.tz()?;

    let snapshot = match load_snapshot(&cfg.weather, tz).await {
        Ok(snapshot) => snapshot,
        Err(e) if !cfg.weather.require_snapshot => {
            warn!(error = %format!("{e:#}"), "starting without weather forecast; date mode will use the fallback heuristic");
            WeatherSnapshot::empty()
        }
        Err(e) => return Err(e.context("weather.require_snapshot is set")),
    };

    let calendar = HolidayCalendar::with_extra_dates(cfg.holidays.extra_dates.iter().copied());
    let holidays = calendar.listed_count();
    let registry = ModelRegistry::load_all(&cfg.models);

    let service = PredictionService::new(
        Arc::new(snapshot),
        Arc::new(calendar),
        Arc::new(registry),
        tz,
    );
    let health = service.health();
    info!(
        lgbm_model = health.models.lgbm_model,
        forecast_model = health.models.forecast_model,
        snapshot_readings = health.snapshot.readings,
        holidays,
        "state ready"
    );

    let app = api::router(AppState::new(service), &cfg.server);

    let addr = cfg.server.socket_addr()?;
    info!(%addr, "starting demand forecast server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}

async fn load_snapshot(cfg: &WeatherConfig, tz: Tz) -> Result<WeatherSnapshot> {
    let key = config::service_key()
        .with_context(|| {
            format!(
                "neither {} nor {} is set",
                config::SERVICE_KEY_VAR,
                config::LEGACY_SERVICE_KEY_VAR
            )
        })?;
    let client = KmaForecastClient::new(cfg, key)?;
    let now = Utc::now().with_timezone(&tz).naive_local();
    Ok(client.load_snapshot(now).await?)
}
