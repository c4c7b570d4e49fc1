use crate::api::geography::GeographyRepository;
use crate::api::poi::PoiRepository;
use crate::api::profile::ProfileRepository;
use crate::error::app_error::AppError;
use crate::geocoding::Geocoder;
use crate::models::dashboard::{LocationState, ProfileDashboard, ProfilePage, VisitedPoi};
use crate::models::ids::PoiId;
use crate::models::poi::Poi;
use crate::models::profile::{Profile, ProfileUpdate, ProfileUpdateForm};
use crate::service::cache::CountriesCache;
use crate::service::navigation::LOGIN_REGISTER_PATH;
use crate::service::resolve::{self, attach_geography, resolve_in_order};
use crate::session::SessionStore;
use std::collections::HashSet;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use validator::Validate;

pub const LOGIN_REQUIRED_MESSAGE: &str = "You need to log in to access your profile.";
pub const PROFILE_LOAD_FAILED_MESSAGE: &str = "Unable to load your profile information.";
pub const PROFILE_LOAD_UNEXPECTED_MESSAGE: &str = "An unexpected error occurred while loading your profile.";
pub const LOCATION_REQUIRED_MESSAGE: &str = "Location is required";
pub const LOCATION_LOGIN_REQUIRED_MESSAGE: &str = "You need to log in again to update your location.";
pub const LOCATION_UPDATE_FAILED_MESSAGE: &str = "Unable to update location.";
pub const LOCATION_UPDATE_UNEXPECTED_MESSAGE: &str = "Unexpected error while updating location.";

/// Message to show next to the location input after a failed update.
pub fn location_error_message(error: &AppError) -> String {
    match error {
        AppError::Unauthenticated => LOCATION_LOGIN_REQUIRED_MESSAGE.to_string(),
        AppError::Transport { .. } => LOCATION_UPDATE_UNEXPECTED_MESSAGE.to_string(),
        other => other.user_message_or(LOCATION_UPDATE_FAILED_MESSAGE),
    }
}

/// Runs `future` unless the view is cancelled first.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, future: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = future => Some(output),
    }
}

/// Builds and maintains the profile dashboard.
pub struct ProfileWorkflow<'a, B: ?Sized, G: ?Sized> {
    backend: &'a B,
    geocoder: &'a G,
    session: &'a SessionStore,
    countries: &'a CountriesCache,
}

impl<'a, B, G> ProfileWorkflow<'a, B, G>
where
    B: ProfileRepository + PoiRepository + GeographyRepository + ?Sized,
    G: Geocoder + ?Sized,
{
    pub fn new(backend: &'a B, geocoder: &'a G, session: &'a SessionStore, countries: &'a CountriesCache) -> Self {
        Self {
            backend,
            geocoder,
            session,
            countries,
        }
    }

    /// Loads the profile, then resolves favorites, visited places, the suggestion and the map location concurrently.
    pub async fn load(&self, cancel: &CancellationToken) -> ProfilePage {
        let Some(token) = self.session.get_token() else {
            return ProfilePage::Unauthenticated {
                message: LOGIN_REQUIRED_MESSAGE.to_string(),
            };
        };

        let Some(response) = until_cancelled(cancel, self.backend.fetch_my_profile(&token)).await else {
            return ProfilePage::Cancelled;
        };

        let profile = match response {
            Ok(response) if response.ok => match response.data {
                Some(profile) => profile,
                None => {
                    warn!(status = response.status, "profile response had no readable body");
                    return ProfilePage::Failed {
                        message: PROFILE_LOAD_FAILED_MESSAGE.to_string(),
                    };
                }
            },
            Ok(response) => {
                warn!(status = response.status, "profile request rejected");
                return ProfilePage::Failed {
                    message: response
                        .message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| PROFILE_LOAD_FAILED_MESSAGE.to_string()),
                };
            }
            Err(e) => {
                warn!(error = %e, "profile request failed");
                return ProfilePage::Failed {
                    message: PROFILE_LOAD_UNEXPECTED_MESSAGE.to_string(),
                };
            }
        };

        let sub_flows = async {
            tokio::join!(
                self.resolve_favorites(&profile.favorites),
                self.resolve_visited(&profile.visited),
                self.select_suggestion(&profile),
                self.resolve_location(profile.location()),
            )
        };
        let Some((favorites, visited, suggestion, location)) = until_cancelled(cancel, sub_flows).await else {
            return ProfilePage::Cancelled;
        };

        info!(
            user_id = %profile.id,
            favorites = favorites.len(),
            visited = visited.len(),
            has_suggestion = suggestion.is_some(),
            "profile dashboard loaded"
        );

        ProfilePage::Loaded(Box::new(ProfileDashboard {
            profile,
            favorites,
            visited,
            suggestion,
            location,
        }))
    }

    pub async fn resolve_favorites(&self, ids: &[PoiId]) -> Vec<Poi> {
        let favorites = resolve_in_order(self.backend, ids).await;
        debug!(requested = ids.len(), resolved = favorites.len(), "favorites resolved");
        favorites
    }

    pub async fn resolve_visited(&self, ids: &[PoiId]) -> Vec<VisitedPoi> {
        let pois = resolve_in_order(self.backend, ids).await;
        if pois.is_empty() {
            return Vec::new();
        }

        let countries = self.countries.get_or_fetch(self.backend).await;
        attach_geography(self.backend, pois, &countries).await
    }

    /// Random POI the user has neither favorited nor visited.
    pub async fn select_suggestion(&self, profile: &Profile) -> Option<Poi> {
        let pois = match self.backend.fetch_all_pois().await.map(|r| r.into_data()) {
            Ok(Some(pois)) => pois,
            Ok(None) => {
                warn!("POI list unavailable, skipping suggestion");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "POI list request failed, skipping suggestion");
                return None;
            }
        };

        let excluded: HashSet<PoiId> = profile.favorites.iter().chain(profile.visited.iter()).cloned().collect();
        resolve::select_suggestion(pois, &excluded, &mut rand::rng())
    }

    pub async fn resolve_location(&self, location: Option<&str>) -> LocationState {
        let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) else {
            return LocationState::Missing;
        };

        match self.geocoder.coordinates_for(location).await {
            Ok(coordinates) => LocationState::Resolved { coordinates },
            Err(e) => {
                warn!(location, error = %e, "location could not be geocoded");
                LocationState::unresolvable()
            }
        }
    }

    /// Saves a new location and refreshes the map for it. Once the server accepted the change this returns `Ok`,
    /// even if the view is cancelled before geocoding finishes; the map is then left [`LocationState::Pending`].
    pub async fn update_location(&self, dashboard: &mut ProfileDashboard, value: &str, cancel: &CancellationToken) -> Result<(), AppError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::InvalidInput(LOCATION_REQUIRED_MESSAGE.to_string()));
        }

        let update = ProfileUpdate::location(value);
        self.apply_update(dashboard, &update, cancel).await
    }

    /// Saves the fields of the edit-user form that actually changed.
    pub async fn update_account(&self, dashboard: &mut ProfileDashboard, form: &ProfileUpdateForm, cancel: &CancellationToken) -> Result<(), AppError> {
        let form = form.normalized(&dashboard.profile);
        form.validate()?;

        let update = form.into_update();
        if update.is_empty() {
            debug!("account form has no changes");
            return Ok(());
        }

        self.apply_update(dashboard, &update, cancel).await
    }

    pub fn logout(&self) -> &'static str {
        if let Err(e) = self.session.clear_token() {
            warn!(error = %e, "failed to remove persisted token");
        }
        LOGIN_REGISTER_PATH
    }

    async fn apply_update(&self, dashboard: &mut ProfileDashboard, update: &ProfileUpdate, cancel: &CancellationToken) -> Result<(), AppError> {
        let token = self.session.require_token()?;

        let response = until_cancelled(cancel, self.backend.update_my_profile(&token, update))
            .await
            .ok_or(AppError::Cancelled)??;

        if !response.ok {
            warn!(status = response.status, "profile update rejected");
            return Err(AppError::http(response.status, response.message));
        }

        match response.data.flatten() {
            Some(profile) => dashboard.profile = profile,
            None => dashboard.profile.patch(update),
        }
        info!(user_id = %dashboard.profile.id, "profile updated");

        if update.location.is_some() {
            dashboard.location = match until_cancelled(cancel, self.resolve_location(dashboard.profile.location())).await {
                Some(location) => location,
                None => {
                    debug!("view cancelled after the profile was saved, map left pending");
                    LocationState::Pending
                }
            };
        }

        Ok(())
    }
}
