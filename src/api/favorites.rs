use crate::api::client::{ApiClient, ApiResponse, require_id, require_token};
use crate::error::app_error::AppError;
use crate::models::auth::MessageResponse;
use crate::models::ids::PoiId;
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[async_trait::async_trait]
pub trait FavoritesRepository: Send + Sync {
    async fn fetch_favorites(&self, token: &str) -> Result<ApiResponse<Vec<PoiId>>, AppError>;
    async fn add_favorite(&self, token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError>;
    async fn remove_favorite(&self, token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError>;
}

/// List entries come back either as bare ids or as `{user_id, poi_id}` rows.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum PoiRef {
    Id(PoiId),
    Row {
        #[serde(alias = "poiId")]
        poi_id: PoiId,
    },
}

impl From<PoiRef> for PoiId {
    fn from(entry: PoiRef) -> Self {
        match entry {
            PoiRef::Id(id) | PoiRef::Row { poi_id: id } => id,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct PoiIdBody<'a> {
    pub poi_id: &'a PoiId,
}

/// Shared by favorites and visited, which expose the same list contract.
pub(crate) async fn fetch_id_list(client: &ApiClient, path: &str, envelope: &str, token: &str) -> Result<ApiResponse<Vec<PoiId>>, AppError> {
    let token = require_token(token)?;
    let response: ApiResponse<Vec<PoiRef>> = client.send_list(client.request(Method::GET, path, Some(token)), Some(envelope)).await?;
    Ok(response.map(|entries| entries.into_iter().map(PoiId::from).filter(|id| !id.is_empty()).collect()))
}

pub(crate) async fn add_to_list(client: &ApiClient, path: &str, token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError> {
    let token = require_token(token)?;
    require_id(id, "poi_id")?;
    let builder = client.request(Method::POST, path, Some(token)).json(&PoiIdBody { poi_id: id });
    client.send(builder, None).await
}

pub(crate) async fn remove_from_list(client: &ApiClient, path: &str, token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError> {
    let token = require_token(token)?;
    require_id(id, "poi_id")?;
    let path = format!("{}/{}", path, urlencoding::encode(id.as_str()));
    client.send(client.request(Method::DELETE, &path, Some(token)), None).await
}

#[async_trait::async_trait]
impl FavoritesRepository for ApiClient {
    async fn fetch_favorites(&self, token: &str) -> Result<ApiResponse<Vec<PoiId>>, AppError> {
        fetch_id_list(self, "/api/favorites", "favorites", token).await
    }

    async fn add_favorite(&self, token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError> {
        add_to_list(self, "/api/favorites", token, id).await
    }

    async fn remove_favorite(&self, token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError> {
        remove_from_list(self, "/api/favorites", token, id).await
    }
}
