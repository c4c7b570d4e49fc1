use crate::api::client::{ApiClient, ApiResponse, require_id};
use crate::error::app_error::AppError;
use crate::models::ids::PoiId;
use crate::models::poi::{Poi, PoiQuery, Tag};
use reqwest::Method;

#[async_trait::async_trait]
pub trait PoiRepository: Send + Sync {
    async fn fetch_poi(&self, id: &PoiId) -> Result<ApiResponse<Poi>, AppError>;
    async fn search_pois(&self, query: &PoiQuery) -> Result<ApiResponse<Vec<Poi>>, AppError>;
    async fn fetch_poi_tags(&self, id: &PoiId) -> Result<ApiResponse<Vec<Tag>>, AppError>;
    async fn fetch_tags(&self) -> Result<ApiResponse<Vec<Tag>>, AppError>;
    async fn fetch_popular_pois(&self) -> Result<ApiResponse<Vec<Poi>>, AppError>;

    async fn fetch_all_pois(&self) -> Result<ApiResponse<Vec<Poi>>, AppError> {
        self.search_pois(&PoiQuery::default()).await
    }

    async fn fetch_pois_by_city_name(&self, city_name: &str) -> Result<ApiResponse<Vec<Poi>>, AppError> {
        self.search_pois(&PoiQuery::by_city(city_name)).await
    }
}

pub(crate) fn poi_path(id: &PoiId) -> String {
    format!("/api/pois/{}", urlencoding::encode(id.as_str()))
}

#[async_trait::async_trait]
impl PoiRepository for ApiClient {
    async fn fetch_poi(&self, id: &PoiId) -> Result<ApiResponse<Poi>, AppError> {
        require_id(id, "poi_id")?;
        self.send(self.request(Method::GET, &poi_path(id), None), Some("poi")).await
    }

    async fn search_pois(&self, query: &PoiQuery) -> Result<ApiResponse<Vec<Poi>>, AppError> {
        let builder = self.request(Method::GET, "/api/pois", None).query(&query.to_pairs());
        self.send_list(builder, Some("pois")).await
    }

    async fn fetch_poi_tags(&self, id: &PoiId) -> Result<ApiResponse<Vec<Tag>>, AppError> {
        require_id(id, "poi_id")?;
        let path = format!("{}/tags", poi_path(id));
        self.send_list(self.request(Method::GET, &path, None), Some("tags")).await
    }

    async fn fetch_tags(&self) -> Result<ApiResponse<Vec<Tag>>, AppError> {
        self.send_list(self.request(Method::GET, "/api/tags", None), Some("tags")).await
    }

    async fn fetch_popular_pois(&self) -> Result<ApiResponse<Vec<Poi>>, AppError> {
        self.send_list(self.request(Method::GET, "/api/popular-pois", None), Some("pois")).await
    }
}
