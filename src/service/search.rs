use crate::api::geography::GeographyRepository;
use crate::api::images::poi_image_url;
use crate::api::poi::PoiRepository;
use crate::api::client::ApiResponse;
use crate::error::app_error::AppError;
use crate::models::dashboard::{PoiCard, details_path};
use crate::models::geography::{City, Country};
use crate::models::poi::{Poi, PoiQuery, Tag};
use serde::Serialize;
use tracing::warn;

/// Filter panel state. Blank fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub name: String,
    pub country_name: String,
    pub city_name: String,
    pub tags: Vec<String>,
}

impl SearchFilters {
    /// Adds the tag if absent, removes it otherwise.
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(index) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(index);
        } else {
            self.tags.push(tag.to_string());
        }
    }

    pub fn to_query(&self) -> PoiQuery {
        let field = |value: &str| Some(value.trim().to_string()).filter(|v| !v.is_empty());
        PoiQuery {
            name: field(&self.name),
            city_name: field(&self.city_name),
            country_name: field(&self.country_name),
            tags: self.tags.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub countries: Vec<Country>,
    pub cities: Vec<City>,
    pub tags: Vec<Tag>,
}

fn list_or_empty<T>(what: &str, result: Result<ApiResponse<Vec<T>>, AppError>) -> Vec<T> {
    match result {
        Ok(response) if response.ok => response.data.unwrap_or_default(),
        Ok(response) => {
            warn!(status = response.status, "{} request rejected", what);
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "{} request failed", what);
            Vec::new()
        }
    }
}

pub struct SearchService<'a, B: ?Sized> {
    backend: &'a B,
    image_base_url: &'a str,
}

impl<'a, B: PoiRepository + GeographyRepository + ?Sized> SearchService<'a, B> {
    pub fn new(backend: &'a B, image_base_url: &'a str) -> Self {
        Self { backend, image_base_url }
    }

    pub async fn filter_options(&self) -> FilterOptions {
        let (countries, cities, tags) = tokio::join!(self.backend.fetch_countries(), self.backend.fetch_cities(), self.backend.fetch_tags());

        FilterOptions {
            countries: list_or_empty("countries", countries),
            cities: list_or_empty("cities", cities),
            tags: list_or_empty("tags", tags),
        }
    }

    pub async fn search(&self, filters: &SearchFilters) -> Vec<PoiCard> {
        let pois = list_or_empty("search", self.backend.search_pois(&filters.to_query()).await);
        self.cards(&pois)
    }

    /// POIs for the location carousel. No request when the city is unknown.
    pub async fn pois_in_city(&self, city_name: &str) -> Vec<Poi> {
        let city_name = city_name.trim();
        if city_name.is_empty() {
            return Vec::new();
        }
        list_or_empty("city POIs", self.backend.fetch_pois_by_city_name(city_name).await)
    }

    pub async fn popular(&self) -> Vec<Poi> {
        list_or_empty("popular POIs", self.backend.fetch_popular_pois().await)
    }

    pub fn cards(&self, pois: &[Poi]) -> Vec<PoiCard> {
        pois.iter()
            .map(|poi| PoiCard {
                poi_id: poi.id.clone(),
                name: poi.name.clone(),
                image_url: poi_image_url(self.image_base_url, &poi.id),
                details_path: details_path(&poi.id),
            })
            .collect()
    }
}

/// Wrap-around slideshow cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Carousel<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> Default for Carousel<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: 0,
        }
    }
}

impl<T> Carousel<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, index: 0 }
    }

    /// Replaces the slides and goes back to the first one.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.index = 0;
    }

    pub fn current(&self) -> Option<&T> {
        self.items.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next(&mut self) -> Option<&T> {
        if !self.items.is_empty() {
            self.index = (self.index + 1) % self.items.len();
        }
        self.current()
    }

    pub fn prev(&mut self) -> Option<&T> {
        if !self.items.is_empty() {
            self.index = (self.index + self.items.len() - 1) % self.items.len();
        }
        self.current()
    }
}
