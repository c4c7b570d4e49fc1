use crate::api::favorites::FavoritesRepository;
use crate::api::images::ImageRepository;
use crate::api::poi::PoiRepository;
use crate::api::visited::VisitedRepository;
use crate::error::app_error::AppError;
use crate::models::dashboard::PoiDetails;
use crate::models::ids::PoiId;
use crate::session::SessionStore;
use tracing::{debug, info, warn};

pub struct DetailsService<'a, B: ?Sized> {
    backend: &'a B,
    session: &'a SessionStore,
}

impl<'a, B> DetailsService<'a, B>
where
    B: PoiRepository + ImageRepository + FavoritesRepository + VisitedRepository + ?Sized,
{
    pub fn new(backend: &'a B, session: &'a SessionStore) -> Self {
        Self { backend, session }
    }

    /// Details, tags, images and the favorite flag, fetched together. `None` when the POI cannot be loaded.
    pub async fn load(&self, poi_id: &PoiId) -> Option<PoiDetails> {
        if poi_id.is_empty() {
            return None;
        }

        let (poi, tags, images, is_favorite) = tokio::join!(
            self.backend.fetch_poi(poi_id),
            self.backend.fetch_poi_tags(poi_id),
            self.backend.fetch_poi_images(poi_id),
            self.is_favorite(poi_id),
        );

        let poi = match poi.map(|r| r.into_data()) {
            Ok(Some(poi)) => poi,
            Ok(None) => {
                debug!(poi_id = %poi_id, "POI not found");
                return None;
            }
            Err(e) => {
                warn!(poi_id = %poi_id, error = %e, "POI request failed");
                return None;
            }
        };

        let tags = tags.ok().and_then(|r| r.into_data()).unwrap_or_default();
        let mut all_images = poi.images.clone();
        for image in images.ok().and_then(|r| r.into_data()).unwrap_or_default() {
            if !image.url.trim().is_empty() && !all_images.contains(&image.url) {
                all_images.push(image.url);
            }
        }

        Some(PoiDetails {
            poi,
            tags,
            images: all_images,
            is_favorite,
        })
    }

    async fn is_favorite(&self, poi_id: &PoiId) -> bool {
        let Some(token) = self.session.get_token() else {
            return false;
        };
        match self.backend.fetch_favorites(&token).await.map(|r| r.into_data()) {
            Ok(Some(ids)) => ids.contains(poi_id),
            _ => false,
        }
    }

    /// Adds or removes the favorite and returns the new state.
    pub async fn toggle_favorite(&self, poi_id: &PoiId, currently_favorite: bool) -> Result<bool, AppError> {
        let token = self.session.require_token()?;
        let response = if currently_favorite {
            self.backend.remove_favorite(&token, poi_id).await?
        } else {
            self.backend.add_favorite(&token, poi_id).await?
        };

        if !response.ok {
            return Err(AppError::http(response.status, response.message));
        }
        info!(poi_id = %poi_id, favorite = !currently_favorite, "favorite toggled");
        Ok(!currently_favorite)
    }

    pub async fn mark_visited(&self, poi_id: &PoiId) -> Result<(), AppError> {
        let token = self.session.require_token()?;
        let response = self.backend.add_visited(&token, poi_id).await?;
        if !response.ok {
            return Err(AppError::http(response.status, response.message));
        }
        info!(poi_id = %poi_id, "marked as visited");
        Ok(())
    }

    pub async fn unmark_visited(&self, poi_id: &PoiId) -> Result<(), AppError> {
        let token = self.session.require_token()?;
        let response = self.backend.remove_visited(&token, poi_id).await?;
        if !response.ok {
            return Err(AppError::http(response.status, response.message));
        }
        info!(poi_id = %poi_id, "visited mark removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockBackend, sample_poi};

    fn backend() -> MockBackend {
        let mut poi = sample_poi("1");
        poi.images = vec!["https://img/cover.jpg".to_string()];
        MockBackend::new()
            .with_pois([poi])
            .with_poi_tags("1", ["museum"])
            .with_poi_images("1", ["https://img/cover.jpg", "https://img/inside.jpg"])
            .with_favorites(["1"])
    }

    #[tokio::test]
    async fn load_merges_images_and_flags_favorite() {
        let backend = backend();
        let session = SessionStore::in_memory();
        session.set_token("jwt").unwrap();

        let details = DetailsService::new(&backend, &session).load(&PoiId::from("1")).await.unwrap();
        assert_eq!(details.tags.len(), 1);
        assert_eq!(details.images, vec!["https://img/cover.jpg".to_string(), "https://img/inside.jpg".to_string()]);
        assert!(details.is_favorite);
        assert_eq!(details.favorite_label(), "Remove from favorites");
    }

    #[tokio::test]
    async fn anonymous_load_is_never_favorite() {
        let backend = backend();
        let session = SessionStore::in_memory();
        let details = DetailsService::new(&backend, &session).load(&PoiId::from("1")).await.unwrap();
        assert!(!details.is_favorite);
        assert_eq!(backend.favorites_fetches(), 0);
    }

    #[tokio::test]
    async fn unknown_poi_is_none() {
        let backend = backend();
        let session = SessionStore::in_memory();
        assert!(DetailsService::new(&backend, &session).load(&PoiId::from("404")).await.is_none());
    }

    #[tokio::test]
    async fn toggle_flips_favorite_state() {
        let backend = backend();
        let session = SessionStore::in_memory();
        session.set_token("jwt").unwrap();
        let service = DetailsService::new(&backend, &session);
        let id = PoiId::from("1");

        assert!(!service.toggle_favorite(&id, true).await.unwrap());
        assert!(backend.favorites().is_empty());
        assert!(service.toggle_favorite(&id, false).await.unwrap());
        assert_eq!(backend.favorites(), vec![id]);
    }

    #[tokio::test]
    async fn toggle_requires_session() {
        let backend = backend();
        let session = SessionStore::in_memory();
        let result = DetailsService::new(&backend, &session).toggle_favorite(&PoiId::from("1"), false).await;
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[tokio::test]
    async fn visited_marks_round_trip() {
        let backend = backend();
        let session = SessionStore::in_memory();
        session.set_token("jwt").unwrap();
        let service = DetailsService::new(&backend, &session);
        let id = PoiId::from("1");

        service.mark_visited(&id).await.unwrap();
        assert_eq!(backend.visited(), vec![id.clone()]);
        service.unmark_visited(&id).await.unwrap();
        assert!(backend.visited().is_empty());
    }
}
