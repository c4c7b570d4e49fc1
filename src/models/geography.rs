use crate::models::ids::{CityId, CountryId};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct City {
    pub id: CityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country_id: Option<CountryId>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub climate: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Country {
    pub id: CountryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub img: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LocationCoordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Splits a free-text "City, Country" location into its city part.
pub fn city_from_location(location: &str) -> &str {
    let trimmed = location.trim();
    match trimmed.split_once(',') {
        Some((city, _)) if !city.trim().is_empty() => city.trim(),
        _ => trimmed,
    }
}
