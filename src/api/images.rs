use crate::api::client::{ApiClient, ApiResponse, require_id};
use crate::api::poi::poi_path;
use crate::error::app_error::AppError;
use crate::models::ids::PoiId;
use crate::models::poi::PoiImage;
use reqwest::Method;

/// Cover image served by the backend for a POI.
pub fn poi_image_url(base_url: &str, id: &PoiId) -> String {
    format!("{}/api/poiimages/{}", base_url.trim_end_matches('/'), urlencoding::encode(id.as_str()))
}

#[async_trait::async_trait]
pub trait ImageRepository: Send + Sync {
    async fn fetch_poi_images(&self, id: &PoiId) -> Result<ApiResponse<Vec<PoiImage>>, AppError>;
    async fn fetch_poi_image_list(&self) -> Result<ApiResponse<Vec<PoiImage>>, AppError>;
}

#[async_trait::async_trait]
impl ImageRepository for ApiClient {
    async fn fetch_poi_images(&self, id: &PoiId) -> Result<ApiResponse<Vec<PoiImage>>, AppError> {
        require_id(id, "poi_id")?;
        let path = format!("{}/poiimages", poi_path(id));
        self.send_list(self.request(Method::GET, &path, None), Some("images")).await
    }

    async fn fetch_poi_image_list(&self) -> Result<ApiResponse<Vec<PoiImage>>, AppError> {
        self.send_list(self.request(Method::GET, "/api/poiimages", None), Some("images")).await
    }
}
