use crate::api::client::{ApiClient, ApiResponse};
use crate::error::app_error::AppError;
use crate::models::auth::{AccessToken, LoginRequest, MessageResponse, RegistrationPayload};
use reqwest::Method;

#[async_trait::async_trait]
pub trait AuthRepository: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<ApiResponse<AccessToken>, AppError>;
    async fn register(&self, payload: &RegistrationPayload) -> Result<ApiResponse<MessageResponse>, AppError>;
}

#[async_trait::async_trait]
impl AuthRepository for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<ApiResponse<AccessToken>, AppError> {
        let builder = self.request(Method::POST, "/api/login", None).json(request);
        self.send(builder, None).await
    }

    async fn register(&self, payload: &RegistrationPayload) -> Result<ApiResponse<MessageResponse>, AppError> {
        let builder = self.request(Method::POST, "/api/register", None).json(payload);
        self.send(builder, None).await
    }
}
