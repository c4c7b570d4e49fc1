use crate::api::client::{ApiClient, ApiResponse};
use crate::error::app_error::AppError;
use crate::models::geography::{City, Country};
use crate::models::ids::CityId;
use reqwest::Method;

#[async_trait::async_trait]
pub trait GeographyRepository: Send + Sync {
    async fn fetch_cities(&self) -> Result<ApiResponse<Vec<City>>, AppError>;
    async fn fetch_city(&self, id: &CityId) -> Result<ApiResponse<City>, AppError>;
    async fn fetch_countries(&self) -> Result<ApiResponse<Vec<Country>>, AppError>;
}

#[async_trait::async_trait]
impl GeographyRepository for ApiClient {
    async fn fetch_cities(&self) -> Result<ApiResponse<Vec<City>>, AppError> {
        self.send_list(self.request(Method::GET, "/api/cities", None), Some("cities")).await
    }

    async fn fetch_city(&self, id: &CityId) -> Result<ApiResponse<City>, AppError> {
        if id.is_empty() {
            return Err(AppError::MissingParameter("city_id"));
        }
        let path = format!("/api/cities/{}", urlencoding::encode(id.as_str()));
        self.send(self.request(Method::GET, &path, None), Some("city")).await
    }

    async fn fetch_countries(&self) -> Result<ApiResponse<Vec<Country>>, AppError> {
        self.send_list(self.request(Method::GET, "/api/countries", None), Some("countries")).await
    }
}
