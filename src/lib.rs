pub mod api;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod models;
pub mod service;
pub mod session;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use error::app_error::AppError;

use crate::api::ApiClient;
use crate::config::SessionBackend;
use crate::geocoding::MapTilerGeocoder;
use crate::service::auth::AuthService;
use crate::service::cache::{CachePolicy, CountriesCache};
use crate::service::details::DetailsService;
use crate::service::navigation::{NavState, RouteGuard, guard};
use crate::service::profile::ProfileWorkflow;
use crate::service::search::SearchService;
use crate::session::{FileTokenStorage, MemoryTokenStorage, SessionStore, TokenStorage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SESSION_FILE: &str = "poi-explorer-session.json";

/// Installs the global subscriber. A second call is a no-op.
pub fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence, e.g. RUST_LOG=info,poi_explorer::service=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    let _ = if json_format { subscriber.json().try_init() } else { subscriber.try_init() };
}

fn token_storage(config: &config::SessionConfig) -> Arc<dyn TokenStorage> {
    match config.backend {
        SessionBackend::Memory => Arc::new(MemoryTokenStorage::default()),
        SessionBackend::File => {
            let path = config.path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));
            Arc::new(FileTokenStorage::new(path))
        }
    }
}

/// Everything a front end needs: one gateway, one session and one countries cache, shared by all views.
#[derive(Debug)]
pub struct PoiExplorer {
    config: Config,
    api: ApiClient,
    geocoder: MapTilerGeocoder,
    session: SessionStore,
    countries: CountriesCache,
}

impl PoiExplorer {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn countries(&self) -> &CountriesCache {
        &self.countries
    }

    pub fn auth(&self) -> AuthService<'_, ApiClient> {
        AuthService::new(&self.api, &self.session)
    }

    pub fn profile(&self) -> ProfileWorkflow<'_, ApiClient, MapTilerGeocoder> {
        ProfileWorkflow::new(&self.api, &self.geocoder, &self.session, &self.countries)
    }

    pub fn search(&self) -> SearchService<'_, ApiClient> {
        SearchService::new(&self.api, self.api.base_url())
    }

    pub fn details(&self) -> DetailsService<'_, ApiClient> {
        DetailsService::new(&self.api, &self.session)
    }

    pub fn nav(&self) -> NavState {
        NavState::from_session(&self.session)
    }

    pub fn guard(&self) -> RouteGuard {
        guard(&self.session)
    }
}

pub fn build_app(config: Config) -> Result<PoiExplorer, AppError> {
    init_tracing(&config.logging.level, config.logging.json_format);

    let api = ApiClient::new(&config.api)?;
    let geocoder = MapTilerGeocoder::new(&config.geocoding, config.api.timeout())?;
    let session = SessionStore::new(token_storage(&config.session));
    let countries = CountriesCache::new(CachePolicy::from_ttl(config.cache.countries_ttl()));

    info!(
        base_url = %api.base_url(),
        session_backend = ?config.session.backend,
        countries_cache = ?countries.policy(),
        authenticated = session.is_authenticated(),
        "poi explorer ready"
    );

    Ok(PoiExplorer {
        config,
        api,
        geocoder,
        session,
        countries,
    })
}

/// [`build_app`] with configuration read from `PoiExplorer.toml`, `.env` and the environment.
pub fn load_app() -> Result<PoiExplorer, AppError> {
    build_app(Config::load()?)
}
