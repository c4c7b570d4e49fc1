use crate::config::GeocodingConfig;
use crate::error::app_error::AppError;
use crate::models::geography::LocationCoordinates;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Turns a free-text place name into map coordinates.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn coordinates_for(&self, query: &str) -> Result<LocationCoordinates, AppError>;
}

#[derive(Deserialize, Debug)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize, Debug)]
struct Feature {
    /// `[lng, lat]`
    center: [f64; 2],
}

/// MapTiler-compatible forward geocoding.
#[derive(Debug, Clone)]
pub struct MapTilerGeocoder {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl MapTilerGeocoder {
    pub fn new(config: &GeocodingConfig, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::transport("Failed to build geocoding client", e))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().map(|k| k.trim().to_string()).filter(|k| !k.is_empty()),
        })
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/geocoding/{}.json", self.endpoint, urlencoding::encode(query))
    }
}

fn first_center(collection: FeatureCollection) -> Result<LocationCoordinates, AppError> {
    collection
        .features
        .into_iter()
        .next()
        .map(|feature| LocationCoordinates {
            lng: feature.center[0],
            lat: feature.center[1],
        })
        .ok_or_else(|| AppError::Geocoding("no match".to_string()))
}

#[async_trait::async_trait]
impl Geocoder for MapTilerGeocoder {
    async fn coordinates_for(&self, query: &str) -> Result<LocationCoordinates, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Geocoding("empty query".to_string()));
        }
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AppError::Geocoding("geocoding API key is not configured".to_string()));
        };

        debug!(query, "geocoding location");
        let response = self
            .http
            .get(self.search_url(query))
            .query(&[("key", api_key), ("limit", "1")])
            .send()
            .await
            .map_err(|e| AppError::transport("Geocoding request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(query, status = status.as_u16(), "geocoder rejected the request");
            return Err(AppError::Geocoding(format!("geocoder responded with {}", status.as_u16())));
        }

        let collection = response
            .json::<FeatureCollection>()
            .await
            .map_err(|e| AppError::Geocoding(format!("unreadable geocoder response: {}", e)))?;

        first_center(collection)
    }
}
