use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment, Provider,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable holding the forecast API key.
pub const SERVICE_KEY_VAR: &str = "SERVICE_KEY";
/// Provider-style name of the same key, read when `SERVICE_KEY` is unset.
pub const LEGACY_SERVICE_KEY_VAR: &str = "serviceKey";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub weather: WeatherConfig,
    pub models: ModelsConfig,
    pub holidays: HolidayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_secs: 30,
            enable_cors: false,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub grid_x: u32,
    pub grid_y: u32,
    pub num_of_rows: u32,
    pub timeout_secs: u64,
    /// IANA zone used for the issue slot and for "today"
    pub timezone: String,
    /// Abort startup when the forecast cannot be loaded
    pub require_snapshot: bool,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "http://apis.data.go.kr/1360000/VilageFcstInfoService_2.0/getVilageFcst"
                .to_string(),
            grid_x: 60,
            grid_y: 127,
            num_of_rows: 1200,
            timeout_secs: 10,
            timezone: "Asia/Seoul".to_string(),
            require_snapshot: false,
        }
    }
}

impl WeatherConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid weather.timezone '{}': {e}", self.timezone))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub lgbm_path: Option<PathBuf>,
    pub forecast_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayConfig {
    /// Holidays beyond the built-in table, `YYYY-MM-DD`
    pub extra_dates: Vec<NaiveDate>,
}

impl Config {
    /// Defaults, then `config/default.toml`, then `DEMAND__*` variables.
    pub fn load() -> Result<Self> {
        Self::from_provider(Toml::file("config/default.toml"))
    }

    pub fn from_provider(file: impl Provider) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(file)
            .merge(Env::prefixed("DEMAND__").split("__"));
        let config: Config = figment.extract()?;
        config.weather.tz()?;
        Ok(config)
    }
}

/// Forecast API key, if set.
pub fn service_key() -> Option<String> {
    service_key_from(|name| std::env::var(name).ok())
}

fn service_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    [SERVICE_KEY_VAR, LEGACY_SERVICE_KEY_VAR]
        .into_iter()
        .filter_map(&lookup)
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
}
