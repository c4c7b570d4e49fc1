use crate::api::auth::AuthRepository;
use crate::error::app_error::AppError;
use crate::models::auth::{LoginForm, LoginRequest, RegisterForm};
use crate::service::navigation::{LOGIN_REGISTER_PATH, MY_PROFILE_PATH};
use crate::session::SessionStore;
use tracing::{info, warn};
use validator::Validate;

/// Where the view goes after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub redirect_to: &'static str,
    pub message: Option<String>,
}

pub struct AuthService<'a, B: ?Sized> {
    backend: &'a B,
    session: &'a SessionStore,
}

impl<'a, B: AuthRepository + ?Sized> AuthService<'a, B> {
    pub fn new(backend: &'a B, session: &'a SessionStore) -> Self {
        Self { backend, session }
    }

    /// Validates locally, exchanges the credentials for a token and starts the session.
    pub async fn login(&self, form: &LoginForm) -> Result<AuthOutcome, AppError> {
        form.validate()?;
        self.authenticate(&form.to_request()).await
    }

    /// Creates the account, then logs in with the same credentials.
    pub async fn register(&self, form: &RegisterForm) -> Result<AuthOutcome, AppError> {
        form.validate()?;

        let response = self.backend.register(&form.to_payload()).await?;
        if !response.ok {
            warn!(status = response.status, "registration rejected");
            return Err(AppError::http(response.status, response.message));
        }
        let message = response.data.and_then(|body| body.message);
        info!(user_name = %form.user_name.trim(), "account registered");

        let credentials = LoginRequest {
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };
        let outcome = self.authenticate(&credentials).await?;
        Ok(AuthOutcome { message, ..outcome })
    }

    pub fn logout(&self) -> AuthOutcome {
        if let Err(e) = self.session.clear_token() {
            warn!(error = %e, "failed to remove persisted token");
        }
        AuthOutcome {
            redirect_to: LOGIN_REGISTER_PATH,
            message: None,
        }
    }

    async fn authenticate(&self, request: &LoginRequest) -> Result<AuthOutcome, AppError> {
        let token = self.backend.login(request).await?.into_result()?;
        if token.access_token.trim().is_empty() {
            return Err(AppError::EmptyResponse);
        }

        self.session.set_token(token.access_token)?;
        Ok(AuthOutcome {
            redirect_to: MY_PROFILE_PATH,
            message: None,
        })
    }
}
