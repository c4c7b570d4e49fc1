use crate::models::geography::{City, Country, LocationCoordinates, city_from_location};
use crate::models::ids::PoiId;
use crate::models::poi::{Poi, Tag};
use crate::models::profile::Profile;
use serde::Serialize;

pub const LOCATION_FORMAT_HINT: &str = "City, Country";
pub const LOCATION_UNRESOLVABLE_MESSAGE: &str = "Unable to determine your location. Please update it.";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VisitedPoi {
    pub poi: Poi,
    pub city: Option<City>,
    pub country: Option<Country>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LocationState {
    /// The profile has no location yet.
    #[default]
    Missing,
    Resolved { coordinates: LocationCoordinates },
    Unresolvable { message: String, hint: String },
    /// Saved on the server but not geocoded yet.
    Pending,
}

impl LocationState {
    pub fn unresolvable() -> Self {
        LocationState::Unresolvable {
            message: LOCATION_UNRESOLVABLE_MESSAGE.to_string(),
            hint: LOCATION_FORMAT_HINT.to_string(),
        }
    }

    pub fn coordinates(&self) -> Option<LocationCoordinates> {
        match self {
            LocationState::Resolved { coordinates } => Some(*coordinates),
            _ => None,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProfileDashboard {
    pub profile: Profile,
    pub favorites: Vec<Poi>,
    pub visited: Vec<VisitedPoi>,
    pub suggestion: Option<Poi>,
    pub location: LocationState,
}

impl ProfileDashboard {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            favorites: Vec::new(),
            visited: Vec::new(),
            suggestion: None,
            location: LocationState::Missing,
        }
    }

    pub fn first_name(&self) -> &str {
        self.profile.first_name()
    }

    pub fn city_name(&self) -> Option<&str> {
        self.profile.location().map(city_from_location)
    }

    /// Counts come from the raw id lists, unresolved ids included.
    pub fn favorite_count(&self) -> usize {
        self.profile.favorites.len()
    }

    pub fn visited_count(&self) -> usize {
        self.profile.visited.len()
    }

    pub fn carousel_title(&self) -> String {
        match (self.city_name(), self.profile.location()) {
            (Some(city), _) if !city.is_empty() => format!("POIs in {}", city),
            (_, Some(location)) => format!("POIs in {}", location),
            _ => "Near me".to_string(),
        }
    }

    pub fn favorite_cards(&self) -> Vec<FavoriteCard> {
        self.favorites.iter().map(FavoriteCard::from).collect()
    }

    pub fn past_trip_cards(&self) -> Vec<PastTripCard> {
        self.visited.iter().map(PastTripCard::from).collect()
    }

    pub fn recommendation_card(&self) -> Option<FavoriteCard> {
        self.suggestion.as_ref().map(FavoriteCard::from)
    }

    pub fn map_widget(&self) -> Option<MapWidget> {
        self.location.coordinates().map(|c| MapWidget::new(c, 12))
    }
}

/// Result of one profile page load.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfilePage {
    Unauthenticated { message: String },
    Failed { message: String },
    Loaded(Box<ProfileDashboard>),
    /// The view went away before the load finished.
    Cancelled,
}

impl ProfilePage {
    pub fn dashboard(&self) -> Option<&ProfileDashboard> {
        match self {
            ProfilePage::Loaded(dashboard) => Some(dashboard.as_ref()),
            _ => None,
        }
    }

    pub fn into_dashboard(self) -> Option<ProfileDashboard> {
        match self {
            ProfilePage::Loaded(dashboard) => Some(*dashboard),
            _ => None,
        }
    }
}

/// Card used for favorites and for the recommendation.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FavoriteCard {
    pub poi_id: PoiId,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub details_path: String,
}

impl From<&Poi> for FavoriteCard {
    fn from(poi: &Poi) -> Self {
        Self {
            poi_id: poi.id.clone(),
            name: poi.name.clone(),
            description: poi.description.clone(),
            tags: poi.tags.clone(),
            image: poi.primary_image().map(str::to_string),
            details_path: details_path(&poi.id),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PastTripCard {
    pub poi_id: PoiId,
    pub name: String,
    pub city_name: Option<String>,
    pub country_name: Option<String>,
    pub country_image: Option<String>,
    pub details_path: String,
}

impl From<&VisitedPoi> for PastTripCard {
    fn from(visited: &VisitedPoi) -> Self {
        Self {
            poi_id: visited.poi.id.clone(),
            name: visited.poi.name.clone(),
            city_name: visited.city.as_ref().map(|c| c.name.clone()),
            country_name: visited.country.as_ref().map(|c| c.name.clone()),
            country_image: visited.country.as_ref().and_then(|c| c.img.clone()),
            details_path: details_path(&visited.poi.id),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PoiCard {
    pub poi_id: PoiId,
    pub name: String,
    pub image_url: String,
    pub details_path: String,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct MapWidget {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

impl MapWidget {
    pub fn new(coordinates: LocationCoordinates, zoom: u8) -> Self {
        Self {
            lat: coordinates.lat,
            lng: coordinates.lng,
            zoom,
        }
    }

    pub fn for_poi(poi: &Poi) -> Self {
        Self {
            lat: poi.latitude,
            lng: poi.longitude,
            zoom: 15,
        }
    }

    /// Map SDKs take `[lng, lat]`.
    pub fn center(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PoiDetails {
    pub poi: Poi,
    pub tags: Vec<Tag>,
    pub images: Vec<String>,
    pub is_favorite: bool,
}

impl PoiDetails {
    pub fn map_widget(&self) -> MapWidget {
        MapWidget::for_poi(&self.poi)
    }

    pub fn favorite_label(&self) -> &'static str {
        if self.is_favorite { "Remove from favorites" } else { "Add to favorites" }
    }
}

pub fn details_path(id: &PoiId) -> String {
    format!("/details/{}", id)
}
