use crate::api::images::poi_image_url;
use crate::config::ApiConfig;
use crate::error::app_error::AppError;
use crate::models::ids::PoiId;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outcome of one backend call. Non-2xx statuses land here instead of in `Err`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub status: u16,
    pub data: Option<T>,
    /// `message`/`msg` from an error body.
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            status: 200,
            data: Some(data),
            message: None,
        }
    }

    pub fn failure(status: u16, message: Option<String>) -> Self {
        Self {
            ok: false,
            status,
            data: None,
            message,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            ok: self.ok,
            status: self.status,
            data: self.data.map(f),
            message: self.message,
        }
    }

    /// `Ok(data)` for a 2xx with a usable body, otherwise the matching [`AppError`].
    pub fn into_result(self) -> Result<T, AppError> {
        if !self.ok {
            return Err(AppError::http(self.status, self.message));
        }
        self.data.ok_or(AppError::EmptyResponse)
    }

    /// Data of a successful call; `None` for failures and unreadable bodies.
    pub fn into_data(self) -> Option<T> {
        if self.ok { self.data } else { None }
    }
}

/// HTTP gateway to the POI backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::transport("Failed to build HTTP client", e))?;

        Ok(Self {
            http,
            base_url: normalize_base_url(&config.base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Public URL of a POI's cover image, for use directly in `<img>`-like widgets.
    pub fn poi_image_url(&self, id: &PoiId) -> String {
        poi_image_url(&self.base_url, id)
    }

    pub(crate) fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.url(path))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder
    }

    /// Sends the request and reads the body as `T`, unwrapping `{ "<envelope>": ... }` when present.
    pub(crate) async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, envelope: Option<&str>) -> Result<ApiResponse<T>, AppError> {
        let request = builder.build().map_err(|e| AppError::transport("Failed to build request", e))?;
        let request_id = Uuid::new_v4();
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let authenticated = request.headers().contains_key(AUTHORIZATION);

        debug!(request_id = %request_id, method = %method, path = %path, authenticated, "sending backend request");

        let response = self.http.execute(request).await.map_err(|e| {
            warn!(request_id = %request_id, method = %method, path = %path, error = %e, "backend unreachable");
            AppError::transport(format!("{} {} failed", method, path), e)
        })?;

        let status = response.status().as_u16();
        let ok = response.status().is_success();
        let body = match response.bytes().await {
            Ok(bytes) => parse_body(&bytes),
            Err(e) => {
                warn!(request_id = %request_id, path = %path, error = %e, "failed to read response body");
                None
            }
        };

        if ok {
            debug!(request_id = %request_id, method = %method, path = %path, status, "backend request succeeded");
        } else {
            warn!(request_id = %request_id, method = %method, path = %path, status, "backend request failed");
        }

        Ok(build_response(status, ok, body, envelope))
    }

    /// [`ApiClient::send`] for list endpoints. Rows that do not match `T` are dropped one by one.
    pub(crate) async fn send_list<T: DeserializeOwned>(&self, builder: RequestBuilder, envelope: Option<&str>) -> Result<ApiResponse<Vec<T>>, AppError> {
        let response: ApiResponse<Vec<Value>> = self.send(builder, envelope).await?;
        Ok(response.map(readable_rows::<T>))
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "response body is not JSON");
            None
        }
    }
}

pub(crate) fn build_response<T: DeserializeOwned>(status: u16, ok: bool, body: Option<Value>, envelope: Option<&str>) -> ApiResponse<T> {
    if !ok {
        return ApiResponse::failure(status, body.as_ref().and_then(error_message));
    }

    ApiResponse {
        ok,
        status,
        data: body.and_then(|value| unwrap_envelope(value, envelope)),
        message: None,
    }
}

pub(crate) fn build_list_response<T: DeserializeOwned>(status: u16, ok: bool, body: Option<Value>, envelope: Option<&str>) -> ApiResponse<Vec<T>> {
    build_response::<Vec<Value>>(status, ok, body, envelope).map(readable_rows::<T>)
}

fn readable_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<T>(row) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!(index, error = %e, "dropping unreadable row");
                None
            }
        })
        .collect()
}

fn error_message(body: &Value) -> Option<String> {
    ["message", "msg", "error"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string)
}

fn unwrap_envelope<T: DeserializeOwned>(value: Value, envelope: Option<&str>) -> Option<T> {
    let inner = match (envelope, value) {
        (Some(key), Value::Object(mut map)) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        (_, value) => value,
    };

    match serde_json::from_value::<T>(inner) {
        Ok(data) => Some(data),
        Err(e) => {
            debug!(envelope = ?envelope, error = %e, "response body did not match the expected shape");
            None
        }
    }
}

pub(crate) fn require_id(id: &PoiId, name: &'static str) -> Result<(), AppError> {
    if id.is_empty() { Err(AppError::MissingParameter(name)) } else { Ok(()) }
}

pub(crate) fn require_token(token: &str) -> Result<&str, AppError> {
    let token = token.trim();
    if token.is_empty() { Err(AppError::Unauthenticated) } else { Ok(token) }
}
