//! Pappi backend REST client.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local persistence, direct API
//!   calls on every operation, re-fetch after every mutation
//! - Plain JSON over REST under the configured `/api` base path
//! - Multipart submissions for writes that may carry an image
//! - Every request carries the tunnel-bypass headers used by the development
//!   network setup
//!
//! # Example
//!
//! ```rust,ignore
//! use pappi_admin::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend)?;
//!
//! // Log in and list active orders
//! let login = client.login("owner@example.com", "hunter2!").await?;
//! let orders = client.orders(restaurant_id).await?;
//! ```

mod analytics;
mod auth;
mod menu;
mod orders;
pub mod types;

pub use analytics::TimeRange;
pub use types::*;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use thiserror::Error;

use pappi_core::{AccountStatus, UserId};

use crate::config::BackendConfig;

/// Headers that skip Pinggy/Localtunnel warning interstitials.
///
/// An artifact of the development network setup, not an auth mechanism.
const TUNNEL_BYPASS_HEADERS: [(&str, &str); 2] = [
    ("bypass-tunnel-reminder", "true"),
    ("pinggy-skip-browser-warning", "true"),
];

/// Errors that can occur when talking to the Pappi backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        message: String,
        /// Account-status code on failed auth responses, if any.
        code: Option<AccountStatus>,
        /// User id carried alongside `NOT_VERIFIED` responses.
        user_id: Option<UserId>,
    },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request construction (bad header value, bad MIME type).
    #[error("Request error: {0}")]
    Request(String),
}

impl BackendError {
    /// The account-status code on this error, if it is an auth branch.
    #[must_use]
    pub const fn account_status(&self) -> Option<AccountStatus> {
        match self {
            Self::Api { code, .. } => *code,
            _ => None,
        }
    }
}

/// Error body shape returned by the backend on failed requests.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    code: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<UserId>,
}

/// Pappi backend API client.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    api_url: String,
}

impl BackendClient {
    /// Create a new backend API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        for (name, value) in TUNNEL_BYPASS_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// Build a full URL for an API path (path must start with `/`).
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    /// Decode a JSON response, mapping failed statuses to [`BackendError::Api`].
    pub(crate) async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(parse_api_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// Check a response for success, discarding the body.
    pub(crate) async fn expect_success(response: reqwest::Response) -> Result<(), BackendError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_api_error(status.as_u16(), &text));
        }
        Ok(())
    }

    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path))
    }

    pub(crate) fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.put(self.url(path))
    }

    pub(crate) fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path))
    }
}

/// Decode an error body into a typed [`BackendError::Api`].
///
/// The backend sends `{error, code, userId}` on auth failures; anything else
/// degrades to the raw body as the message.
fn parse_api_error(status: u16, body: &str) -> BackendError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => BackendError::Api {
            status,
            message: parsed
                .error
                .unwrap_or_else(|| "Request failed".to_string()),
            code: parsed.code.as_deref().and_then(AccountStatus::from_code),
            user_id: parsed.user_id,
        },
        Err(_) => BackendError::Api {
            status,
            message: if body.is_empty() {
                "Request failed".to_string()
            } else {
                body.to_string()
            },
            code: None,
            user_id: None,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_error_with_code() {
        let err = parse_api_error(
            403,
            r#"{"error":"Account awaiting verification","code":"NOT_VERIFIED","userId":12}"#,
        );
        match err {
            BackendError::Api {
                status,
                message,
                code,
                user_id,
            } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Account awaiting verification");
                assert_eq!(code, Some(AccountStatus::NotVerified));
                assert_eq!(user_id, Some(UserId::new(12)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_api_error_unknown_code() {
        let err = parse_api_error(400, r#"{"error":"Bad request","code":"WHATEVER"}"#);
        assert_eq!(err.account_status(), None);
    }

    #[test]
    fn test_parse_api_error_non_json_body() {
        let err = parse_api_error(502, "<html>Bad Gateway</html>");
        match err {
            BackendError::Api {
                status, message, ..
            } => {
                assert_eq!(status, 502);
                assert_eq!(message, "<html>Bad Gateway</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_api_error_empty_body() {
        let err = parse_api_error(500, "");
        match err {
            BackendError::Api { message, .. } => assert_eq!(message, "Request failed"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
