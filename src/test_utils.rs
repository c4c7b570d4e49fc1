use crate::api::auth::AuthRepository;
use crate::api::client::ApiResponse;
use crate::api::favorites::FavoritesRepository;
use crate::api::geography::GeographyRepository;
use crate::api::images::ImageRepository;
use crate::api::poi::PoiRepository;
use crate::api::profile::ProfileRepository;
use crate::api::visited::VisitedRepository;
use crate::error::app_error::AppError;
use crate::geocoding::Geocoder;
use crate::models::auth::{AccessToken, LoginRequest, MessageResponse, RegistrationPayload};
use crate::models::geography::{City, Country, LocationCoordinates};
use crate::models::ids::{CityId, CountryId, PoiId, UserId};
use crate::models::poi::{Poi, PoiImage, PoiQuery, Tag};
use crate::models::profile::{Profile, ProfileUpdate};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

pub fn sample_poi(id: &str) -> Poi {
    Poi {
        id: PoiId::from(id),
        name: format!("POI {}", id),
        description: format!("Description of POI {}", id),
        latitude: 40.0,
        longitude: -3.0,
        ..Poi::default()
    }
}

pub fn sample_city(id: &str, country_id: Option<&str>) -> City {
    City {
        id: CityId::from(id),
        name: format!("City {}", id),
        country_id: country_id.map(CountryId::from),
        ..City::default()
    }
}

pub fn sample_country(id: &str) -> Country {
    Country {
        id: CountryId::from(id),
        name: format!("Country {}", id),
        img: Some(format!("https://img/flags/{}.png", id)),
    }
}

pub fn sample_profile() -> Profile {
    Profile {
        id: UserId::from("1"),
        name: "Ada Lovelace".to_string(),
        user_name: "ada_l".to_string(),
        email: "ada@mail.com".to_string(),
        ..Profile::default()
    }
}

type Rejection = (u16, Option<String>);

fn rejected<T>(rejection: &Rejection) -> ApiResponse<T> {
    ApiResponse::failure(rejection.0, rejection.1.clone())
}

fn not_found<T>() -> ApiResponse<T> {
    ApiResponse::failure(404, Some("Not found".to_string()))
}

/// Scripted in-memory backend. Every trait call is counted by name.
#[derive(Default)]
pub struct MockBackend {
    profile: Option<Profile>,
    profile_rejection: Option<Rejection>,
    update_echo: Option<Profile>,
    update_rejection: Option<Rejection>,
    login_token: Option<String>,
    login_rejection: Option<Rejection>,
    pois: Vec<Poi>,
    poi_list_fails: bool,
    popular: Vec<Poi>,
    tags: Vec<Tag>,
    poi_tags: HashMap<PoiId, Vec<Tag>>,
    poi_images: HashMap<PoiId, Vec<PoiImage>>,
    cities: Vec<City>,
    countries: Vec<Country>,
    countries_fail: bool,
    favorites: Mutex<Vec<PoiId>>,
    visited: Mutex<Vec<PoiId>>,
    last_update: Mutex<Option<ProfileUpdate>>,
    last_registration: Mutex<Option<RegistrationPayload>>,
    last_query: Mutex<Option<PoiQuery>>,
    calls: Mutex<Vec<&'static str>>,
    total: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn rejecting_profile(mut self, status: u16, message: Option<&str>) -> Self {
        self.profile_rejection = Some((status, message.map(str::to_string)));
        self
    }

    pub fn echoing_updates(mut self, profile: Profile) -> Self {
        self.update_echo = Some(profile);
        self
    }

    pub fn rejecting_updates(mut self, status: u16, message: Option<&str>) -> Self {
        self.update_rejection = Some((status, message.map(str::to_string)));
        self
    }

    pub fn with_login_token(mut self, token: &str) -> Self {
        self.login_token = Some(token.to_string());
        self
    }

    pub fn rejecting_login(mut self, status: u16, message: Option<&str>) -> Self {
        self.login_rejection = Some((status, message.map(str::to_string)));
        self
    }

    pub fn with_pois(mut self, pois: impl IntoIterator<Item = Poi>) -> Self {
        self.pois.extend(pois);
        self
    }

    pub fn failing_poi_list(mut self) -> Self {
        self.poi_list_fails = true;
        self
    }

    pub fn with_popular(mut self, pois: impl IntoIterator<Item = Poi>) -> Self {
        self.popular.extend(pois);
        self
    }

    pub fn with_tags<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.tags.extend(names.into_iter().map(tag));
        self
    }

    pub fn with_poi_tags<'a>(mut self, id: &str, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.poi_tags.insert(PoiId::from(id), names.into_iter().map(tag).collect());
        self
    }

    pub fn with_poi_images<'a>(mut self, id: &str, urls: impl IntoIterator<Item = &'a str>) -> Self {
        let images = urls
            .into_iter()
            .map(|url| PoiImage {
                id: None,
                poi_id: Some(PoiId::from(id)),
                url: url.to_string(),
            })
            .collect();
        self.poi_images.insert(PoiId::from(id), images);
        self
    }

    pub fn with_cities(mut self, cities: impl IntoIterator<Item = City>) -> Self {
        self.cities.extend(cities);
        self
    }

    pub fn with_countries(mut self, countries: impl IntoIterator<Item = Country>) -> Self {
        self.countries.extend(countries);
        self
    }

    pub fn failing_countries(mut self) -> Self {
        self.countries_fail = true;
        self
    }

    pub fn with_favorites<'a>(self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        if let Ok(mut favorites) = self.favorites.lock() {
            favorites.extend(ids.into_iter().map(PoiId::from));
        }
        self
    }

    fn record(&self, call: &'static str) {
        self.total.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call);
    }

    fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn poi_fetches(&self) -> usize {
        self.count("fetch_poi")
    }

    pub fn city_fetches(&self) -> usize {
        self.count("fetch_city")
    }

    pub fn country_fetches(&self) -> usize {
        self.count("fetch_countries")
    }

    pub fn login_calls(&self) -> usize {
        self.count("login")
    }

    pub fn register_calls(&self) -> usize {
        self.count("register")
    }

    pub fn favorites_fetches(&self) -> usize {
        self.count("fetch_favorites")
    }

    pub fn favorites(&self) -> Vec<PoiId> {
        self.favorites.lock().unwrap().clone()
    }

    pub fn visited(&self) -> Vec<PoiId> {
        self.visited.lock().unwrap().clone()
    }

    pub fn last_update(&self) -> Option<ProfileUpdate> {
        self.last_update.lock().unwrap().clone()
    }

    pub fn last_registration(&self) -> Option<RegistrationPayload> {
        self.last_registration.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<PoiQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

fn tag(name: &str) -> Tag {
    Tag {
        id: None,
        name: name.to_string(),
    }
}

fn acknowledged() -> ApiResponse<MessageResponse> {
    ApiResponse::success(MessageResponse {
        message: Some("OK".to_string()),
    })
}

#[async_trait::async_trait]
impl AuthRepository for MockBackend {
    async fn login(&self, _request: &LoginRequest) -> Result<ApiResponse<AccessToken>, AppError> {
        self.record("login");
        if let Some(rejection) = &self.login_rejection {
            return Ok(rejected(rejection));
        }
        Ok(match &self.login_token {
            Some(token) => ApiResponse::success(AccessToken {
                access_token: token.clone(),
            }),
            None => ApiResponse::failure(401, Some("Bad username or password".to_string())),
        })
    }

    async fn register(&self, payload: &RegistrationPayload) -> Result<ApiResponse<MessageResponse>, AppError> {
        self.record("register");
        *self.last_registration.lock().unwrap() = Some(payload.clone());
        Ok(ApiResponse::success(MessageResponse {
            message: Some("User created successfully".to_string()),
        }))
    }
}

#[async_trait::async_trait]
impl ProfileRepository for MockBackend {
    async fn fetch_my_profile(&self, _token: &str) -> Result<ApiResponse<Profile>, AppError> {
        self.record("fetch_my_profile");
        if let Some(rejection) = &self.profile_rejection {
            return Ok(rejected(rejection));
        }
        Ok(self.profile.clone().map_or_else(not_found, ApiResponse::success))
    }

    async fn update_my_profile(&self, _token: &str, update: &ProfileUpdate) -> Result<ApiResponse<Option<Profile>>, AppError> {
        self.record("update_my_profile");
        *self.last_update.lock().unwrap() = Some(update.clone());
        if let Some(rejection) = &self.update_rejection {
            return Ok(rejected(rejection));
        }
        Ok(ApiResponse::success(self.update_echo.clone()))
    }
}

#[async_trait::async_trait]
impl PoiRepository for MockBackend {
    async fn fetch_poi(&self, id: &PoiId) -> Result<ApiResponse<Poi>, AppError> {
        self.record("fetch_poi");
        Ok(self.pois.iter().find(|p| &p.id == id).cloned().map_or_else(not_found, ApiResponse::success))
    }

    async fn search_pois(&self, query: &PoiQuery) -> Result<ApiResponse<Vec<Poi>>, AppError> {
        self.record("search_pois");
        *self.last_query.lock().unwrap() = Some(query.clone());
        if self.poi_list_fails {
            return Ok(ApiResponse::failure(500, None));
        }
        Ok(ApiResponse::success(self.pois.clone()))
    }

    async fn fetch_poi_tags(&self, id: &PoiId) -> Result<ApiResponse<Vec<Tag>>, AppError> {
        self.record("fetch_poi_tags");
        Ok(ApiResponse::success(self.poi_tags.get(id).cloned().unwrap_or_default()))
    }

    async fn fetch_tags(&self) -> Result<ApiResponse<Vec<Tag>>, AppError> {
        self.record("fetch_tags");
        Ok(ApiResponse::success(self.tags.clone()))
    }

    async fn fetch_popular_pois(&self) -> Result<ApiResponse<Vec<Poi>>, AppError> {
        self.record("fetch_popular_pois");
        Ok(ApiResponse::success(self.popular.clone()))
    }
}

#[async_trait::async_trait]
impl ImageRepository for MockBackend {
    async fn fetch_poi_images(&self, id: &PoiId) -> Result<ApiResponse<Vec<PoiImage>>, AppError> {
        self.record("fetch_poi_images");
        Ok(ApiResponse::success(self.poi_images.get(id).cloned().unwrap_or_default()))
    }

    async fn fetch_poi_image_list(&self) -> Result<ApiResponse<Vec<PoiImage>>, AppError> {
        self.record("fetch_poi_image_list");
        Ok(ApiResponse::success(self.poi_images.values().flatten().cloned().collect()))
    }
}

#[async_trait::async_trait]
impl GeographyRepository for MockBackend {
    async fn fetch_cities(&self) -> Result<ApiResponse<Vec<City>>, AppError> {
        self.record("fetch_cities");
        Ok(ApiResponse::success(self.cities.clone()))
    }

    async fn fetch_city(&self, id: &CityId) -> Result<ApiResponse<City>, AppError> {
        self.record("fetch_city");
        Ok(self.cities.iter().find(|c| &c.id == id).cloned().map_or_else(not_found, ApiResponse::success))
    }

    async fn fetch_countries(&self) -> Result<ApiResponse<Vec<Country>>, AppError> {
        self.record("fetch_countries");
        if self.countries_fail {
            return Ok(ApiResponse::failure(503, None));
        }
        Ok(ApiResponse::success(self.countries.clone()))
    }
}

#[async_trait::async_trait]
impl FavoritesRepository for MockBackend {
    async fn fetch_favorites(&self, _token: &str) -> Result<ApiResponse<Vec<PoiId>>, AppError> {
        self.record("fetch_favorites");
        Ok(ApiResponse::success(self.favorites()))
    }

    async fn add_favorite(&self, _token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError> {
        self.record("add_favorite");
        let mut favorites = self.favorites.lock().unwrap();
        if !favorites.contains(id) {
            favorites.push(id.clone());
        }
        Ok(acknowledged())
    }

    async fn remove_favorite(&self, _token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError> {
        self.record("remove_favorite");
        self.favorites.lock().unwrap().retain(|f| f != id);
        Ok(acknowledged())
    }
}

#[async_trait::async_trait]
impl VisitedRepository for MockBackend {
    async fn fetch_visited(&self, _token: &str) -> Result<ApiResponse<Vec<PoiId>>, AppError> {
        self.record("fetch_visited");
        Ok(ApiResponse::success(self.visited()))
    }

    async fn add_visited(&self, _token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError> {
        self.record("add_visited");
        let mut visited = self.visited.lock().unwrap();
        if !visited.contains(id) {
            visited.push(id.clone());
        }
        Ok(acknowledged())
    }

    async fn remove_visited(&self, _token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError> {
        self.record("remove_visited");
        self.visited.lock().unwrap().retain(|v| v != id);
        Ok(acknowledged())
    }
}

/// Geocoder with a fixed answer table.
#[derive(Default)]
pub struct MockGeocoder {
    places: HashMap<String, LocationCoordinates>,
    calls: AtomicUsize,
    cancel_on_call: Option<CancellationToken>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &str, lat: f64, lng: f64) -> Self {
        self.places.insert(query.to_string(), LocationCoordinates { lat, lng });
        self
    }

    /// Cancels `token` from inside the lookup, as if the view closed mid-request.
    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_call = Some(token);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Geocoder for MockGeocoder {
    async fn coordinates_for(&self, query: &str) -> Result<LocationCoordinates, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.cancel_on_call {
            token.cancel();
            tokio::task::yield_now().await;
        }
        self.places
            .get(query.trim())
            .copied()
            .ok_or_else(|| AppError::Geocoding("no match".to_string()))
    }
}
