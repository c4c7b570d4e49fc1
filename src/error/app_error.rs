use thiserror::Error;
use validator::ValidationErrors;

/// Fallback shown when the backend did not say what went wrong.
pub const GENERIC_REQUEST_ERROR: &str = "Request error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Request failed with status {status}")]
    Http { status: u16, message: Option<String> },
    #[error("Request error")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Empty response body")]
    EmptyResponse,
    #[error("Location could not be resolved: {0}")]
    Geocoding(String),
    #[error("Session storage error")]
    Storage {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error")]
    ConfigurationError {
        message: String,
        #[source]
        source: figment::Error,
    },
    #[error("Operation cancelled")]
    Cancelled,
}

impl AppError {
    pub fn transport(message: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            message: message.into(),
            source,
        }
    }

    pub fn storage(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            message: message.into(),
            source,
        }
    }

    pub fn http(status: u16, message: Option<String>) -> Self {
        Self::Http { status, message }
    }

    /// Single line to show the user. Prefers text supplied by the server.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Http { message: Some(message), .. } if !message.trim().is_empty() => message.clone(),
            AppError::Http { .. } | AppError::Transport { .. } | AppError::EmptyResponse => GENERIC_REQUEST_ERROR.to_string(),
            AppError::InvalidInput(message) => message.clone(),
            AppError::Unauthenticated => "You need to log in to continue.".to_string(),
            other => other.to_string(),
        }
    }

    /// Same as [`AppError::user_message`] but with a caller-chosen fallback for HTTP failures.
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            AppError::Http { message: Some(message), .. } if !message.trim().is_empty() => message.clone(),
            AppError::Http { .. } | AppError::Transport { .. } | AppError::EmptyResponse => fallback.to_string(),
            other => other.user_message(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthenticated | AppError::Http { status: 401, .. })
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::ConfigurationError {
            message: "Failed to read configuration".to_string(),
            source: e,
        }
    }
}
