use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";
pub const DEFAULT_GEOCODING_ENDPOINT: &str = "https://api.maptiler.com";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub api: ApiConfig,
    pub geocoding: GeocodingConfig,
    pub session: SessionConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeocodingConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    /// Only read when `backend = "file"`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CacheConfig {
    /// `None` keeps the countries list for the lifetime of the app.
    pub countries_ttl_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_seconds: 30,
            user_agent: concat!("poi-explorer/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODING_ENDPOINT.to_string(),
            api_key: None,
        }
    }
}

impl CacheConfig {
    pub fn countries_ttl(&self) -> Option<Duration> {
        self.countries_ttl_seconds.map(Duration::from_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. PoiExplorer.toml (base configuration file)
    /// 2. Environment variables (prefixed with POI_, sections split on `__`)
    /// 3. BACKEND_URL / MAPTILER_KEY (names used by the old web front end)
    pub fn load() -> Result<Self, figment::Error> {
        dotenvy::dotenv().ok();
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::string(&toml::to_string(&Config::default()).unwrap_or_default()))
            .merge(Toml::file("PoiExplorer.toml"))
            .merge(Env::prefixed("POI_").split("__"))
            .merge(Env::raw().only(&["BACKEND_URL"]).map(|_| "api.base_url".into()))
            .merge(Env::raw().only(&["MAPTILER_KEY"]).map(|_| "geocoding.api_key".into()))
    }
}
