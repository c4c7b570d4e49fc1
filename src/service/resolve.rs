use crate::api::geography::GeographyRepository;
use crate::api::poi::PoiRepository;
use crate::models::dashboard::VisitedPoi;
use crate::models::geography::{City, Country};
use crate::models::ids::{CityId, CountryId, PoiId};
use crate::models::poi::Poi;
use futures::future::join_all;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Ids in first-seen order, without duplicates or blanks.
pub fn distinct<'a, T: Eq + std::hash::Hash + 'a>(ids: impl IntoIterator<Item = &'a T>) -> Vec<&'a T> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Fetches every distinct id once, concurrently, and returns the POIs in the order of `ids`.
/// Duplicates are repeated; ids that fail to resolve are dropped.
pub async fn resolve_in_order<B: PoiRepository + ?Sized>(backend: &B, ids: &[PoiId]) -> Vec<Poi> {
    let unique: Vec<&PoiId> = distinct(ids.iter().filter(|id| !id.is_empty()));
    if unique.is_empty() {
        return Vec::new();
    }

    let responses = join_all(unique.iter().map(|id| backend.fetch_poi(id))).await;

    let mut resolved: HashMap<&PoiId, Poi> = HashMap::with_capacity(unique.len());
    for (id, response) in unique.into_iter().zip(responses) {
        match response.map(|r| r.into_data()) {
            Ok(Some(poi)) => {
                resolved.insert(id, poi);
            }
            Ok(None) => debug!(poi_id = %id, "dropping POI that could not be loaded"),
            Err(e) => debug!(poi_id = %id, error = %e, "dropping POI after request error"),
        }
    }

    ids.iter().filter_map(|id| resolved.get(id).cloned()).collect()
}

/// Uniform pick among `pois` whose id is not in `excluded`.
pub fn select_suggestion<R: Rng + ?Sized>(pois: Vec<Poi>, excluded: &HashSet<PoiId>, rng: &mut R) -> Option<Poi> {
    let candidates: Vec<Poi> = pois.into_iter().filter(|poi| !excluded.contains(&poi.id)).collect();
    candidates.choose(rng).cloned()
}

/// Looks up each distinct city once and pairs every visited POI with its city and country.
pub async fn attach_geography<B: GeographyRepository + ?Sized>(backend: &B, pois: Vec<Poi>, countries: &HashMap<CountryId, Country>) -> Vec<VisitedPoi> {
    let city_ids: Vec<&CityId> = distinct(pois.iter().filter_map(|poi| poi.city_id.as_ref()));
    let responses = join_all(city_ids.iter().map(|id| backend.fetch_city(id))).await;

    let mut cities: HashMap<CityId, City> = HashMap::with_capacity(city_ids.len());
    for (id, response) in city_ids.into_iter().zip(responses) {
        match response.map(|r| r.into_data()) {
            Ok(Some(city)) => {
                cities.insert(id.clone(), city);
            }
            Ok(None) => debug!(city_id = %id, "city could not be loaded"),
            Err(e) => debug!(city_id = %id, error = %e, "city request failed"),
        }
    }

    pois.into_iter()
        .map(|poi| {
            let city = poi.city_id.as_ref().and_then(|id| cities.get(id)).cloned();
            let country = city
                .as_ref()
                .and_then(|c| c.country_id.as_ref())
                .and_then(|id| countries.get(id))
                .cloned();
            VisitedPoi { poi, city, country }
        })
        .collect()
}
