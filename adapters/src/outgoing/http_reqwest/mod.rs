pub mod balance_http;
pub mod checkout_http;
pub mod coupon_http;
pub mod jobs_http;
pub mod paid_action_http;
pub mod profile_http;

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use url::Url;

use poolify_application::{
    error::{AppError, AppResult},
    infrastructure_config::BackendConfig,
};

/// Shared HTTP client for every backend endpoint.
#[derive(Clone)]
pub struct BackendHttpClient {
    http: Client,
    base_url: Url,
}

impl BackendHttpClient {
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let base_url = config.parsed_base_url()?;

        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(|e| AppError::ConfigError {
            message: format!("Failed to build HTTP client: {e}"),
        })?;

        Ok(Self { http, base_url })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the configured base URL.
    pub fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::ConfigError {
                message: format!("Backend base_url cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

pub(crate) fn transport_error(e: &reqwest::Error) -> AppError {
    let message = if e.is_timeout() {
        "Backend request timed out".to_string()
    } else if e.is_connect() {
        format!("Could not reach backend: {e}")
    } else {
        e.to_string()
    };
    AppError::TransportError { message }
}

pub(crate) fn status_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
}

pub(crate) fn error_field(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

/// Reads a JSON body, treating a non-success status or an `error` field as failure.
///
/// A success status with a body that is not JSON (a proxy or maintenance page)
/// is a transport failure, never an empty payload.
pub(crate) async fn read_json(response: Response) -> AppResult<Value> {
    let status = response.status();
    let text = response.text().await.map_err(|e| transport_error(&e))?;
    let parsed = serde_json::from_str::<Value>(&text);

    if !status.is_success() {
        let body = parsed.unwrap_or(Value::Null);
        return Err(AppError::ExternalServiceError {
            message: error_field(&body).unwrap_or_else(|| status_message(status)),
        });
    }

    let body = parsed.map_err(|e| AppError::TransportError {
        message: format!("Invalid JSON response (HTTP {}): {e}", status.as_u16()),
    })?;

    if body.get("error").is_some_and(|e| !e.is_null()) {
        return Err(AppError::ExternalServiceError {
            message: error_field(&body).unwrap_or_else(|| status_message(status)),
        });
    }

    Ok(body)
}
