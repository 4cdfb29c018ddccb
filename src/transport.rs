//! One-shot HTTP exchanges.
//!
//! [`Transport`] performs exactly one request and reports either the
//! response (whatever its status) or a transport-level failure.  Retrying
//! lives one layer up in [`crate::retry`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};

/// Default timeout applied to each individual attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything needed to replay a request: method, headers and body.
///
/// Cloning is cheap; the body is reference counted.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
}

impl RequestOptions {
    /// Build a `POST` with a JSON body and `Content-Type: application/json`.
    pub fn post_json<T: Serialize + ?Sized>(body: &T) -> Result<Self> {
        let body = serde_json::to_vec(body).map_err(|e| {
            Error::serialization(
                format!("Failed to serialize request: {}", e),
                Some(Box::new(e)),
            )
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(Self {
            method: Method::POST,
            headers,
            body: Bytes::from(body),
        })
    }
}

/// A fully received HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    body: Bytes,
}

impl HttpResponse {
    /// Create a response from a status code and body.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Create a response from a raw status code.
    ///
    /// Codes outside 100..=999 are mapped to 500.
    pub fn from_status_code(code: u16, body: impl Into<Bytes>) -> Self {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, body)
    }

    /// The HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true for 429 Too Many Requests.
    pub fn is_rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }

    /// The canonical reason phrase, if the status has one.
    pub fn status_text(&self) -> Option<&'static str> {
        self.status.canonical_reason()
    }

    /// The raw body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

/// Performs a single HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request.
    ///
    /// Returns `Ok` for any response that arrived, regardless of status, and
    /// `Err` only when no response could be obtained.
    async fn execute(&self, url: &Url, options: &RequestOptions) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, url: &Url, options: &RequestOptions) -> Result<HttpResponse> {
        (**self).execute(url, options).await
    }
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with the default per-attempt timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport with a custom per-attempt timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        Ok(Self { client, timeout })
    }

    /// The per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, url: &Url, options: &RequestOptions) -> Result<HttpResponse> {
        let response = self
            .client
            .request(options.method.clone(), url.clone())
            .headers(options.headers.clone())
            .body(options.body.clone())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        Ok(HttpResponse::new(status, body))
    }
}
