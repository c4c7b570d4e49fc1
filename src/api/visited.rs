use crate::api::client::{ApiClient, ApiResponse};
use crate::api::favorites::{add_to_list, fetch_id_list, remove_from_list};
use crate::error::app_error::AppError;
use crate::models::auth::MessageResponse;
use crate::models::ids::PoiId;

const VISITED_PATH: &str = "/api/visited";

#[async_trait::async_trait]
pub trait VisitedRepository: Send + Sync {
    async fn fetch_visited(&self, token: &str) -> Result<ApiResponse<Vec<PoiId>>, AppError>;
    async fn add_visited(&self, token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError>;
    async fn remove_visited(&self, token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError>;
}

#[async_trait::async_trait]
impl VisitedRepository for ApiClient {
    async fn fetch_visited(&self, token: &str) -> Result<ApiResponse<Vec<PoiId>>, AppError> {
        fetch_id_list(self, VISITED_PATH, "visited", token).await
    }

    async fn add_visited(&self, token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError> {
        add_to_list(self, VISITED_PATH, token, id).await
    }

    async fn remove_visited(&self, token: &str, id: &PoiId) -> Result<ApiResponse<MessageResponse>, AppError> {
        remove_from_list(self, VISITED_PATH, token, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    #[tokio::test]
    async fn visited_requires_a_token() {
        let client = ApiClient::new(&ApiConfig::default()).unwrap();
        assert!(matches!(client.fetch_visited(" ").await, Err(AppError::Unauthenticated)));
        assert!(matches!(client.add_visited("", &PoiId::from("2")).await, Err(AppError::Unauthenticated)));
    }
}
