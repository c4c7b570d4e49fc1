use crate::api::client::{ApiClient, ApiResponse, require_token};
use crate::error::app_error::AppError;
use crate::models::profile::{Profile, ProfileUpdate};
use reqwest::Method;

const MY_PROFILE_PATH: &str = "/api/myProfile";

#[async_trait::async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn fetch_my_profile(&self, token: &str) -> Result<ApiResponse<Profile>, AppError>;
    /// `data` is `None` when the server acknowledges without echoing the profile.
    async fn update_my_profile(&self, token: &str, update: &ProfileUpdate) -> Result<ApiResponse<Option<Profile>>, AppError>;
}

#[async_trait::async_trait]
impl ProfileRepository for ApiClient {
    async fn fetch_my_profile(&self, token: &str) -> Result<ApiResponse<Profile>, AppError> {
        let token = require_token(token)?;
        self.send(self.request(Method::GET, MY_PROFILE_PATH, Some(token)), Some("user")).await
    }

    async fn update_my_profile(&self, token: &str, update: &ProfileUpdate) -> Result<ApiResponse<Option<Profile>>, AppError> {
        let token = require_token(token)?;
        let builder = self.request(Method::PUT, MY_PROFILE_PATH, Some(token)).json(update);
        let response: ApiResponse<Profile> = self.send(builder, Some("user")).await?;

        // A 2xx without a readable profile is still a success.
        Ok(ApiResponse {
            ok: response.ok,
            status: response.status,
            data: if response.ok { Some(response.data) } else { None },
            message: response.message,
        })
    }
}
