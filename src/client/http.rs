//! HTTP transport over reqwest.
//!
//! Requires the `http` feature.
//!
//! ## Example
//!
//! ```ignore
//! use jsonapi_store::client::http::{HttpOptions, HttpTransport};
//! use jsonapi_store::{client::JsonApi, Config};
//!
//! let api = JsonApi::new(HttpTransport::new("https://api.example.com"), Config::default());
//! let widgets = api
//!     .get_with("widget", HttpOptions::new().query("filter[color]", "black"))
//!     .await?;
//! ```

use std::fmt;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::RequestBuilder;
use serde_json::Value;
use tracing::debug;

use super::Transport;
use crate::resource::Document;

/// The JSON:API media type.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// Per-request options: query parameters and extra headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpOptions {
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug)]
pub enum HttpError {
    /// The request could not be sent or the body not read.
    Request(reqwest::Error),
    /// The server answered with a non-success status.
    Status { status: u16, body: Option<Value> },
    /// The body could not be encoded or decoded as JSON.
    Json(String),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::Request(e) => write!(f, "HTTP error: {}", e),
            HttpError::Status { status, .. } => write!(f, "server responded with status {}", status),
            HttpError::Json(message) => write!(f, "JSON error: {}", message),
        }
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HttpError::Request(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        HttpError::Request(err)
    }
}

impl HttpError {
    /// Status code of a failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Request(e) => e.status().map(|s| s.as_u16()),
            HttpError::Status { status, .. } => Some(*status),
            HttpError::Json(_) => None,
        }
    }
}

/// Transport that talks to a JSON:API server under `base_url`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a preconfigured client (timeouts, default headers, auth...).
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_body(request: RequestBuilder, body: &Document) -> Result<RequestBuilder, HttpError> {
        let bytes = serde_json::to_vec(body).map_err(|e| HttpError::Json(e.to_string()))?;
        Ok(request.header(CONTENT_TYPE, MEDIA_TYPE).body(bytes))
    }

    async fn send(&self, request: RequestBuilder, options: HttpOptions) -> Result<Option<Value>, HttpError> {
        let mut request = request.header(ACCEPT, MEDIA_TYPE).query(&options.query);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(status = status.as_u16(), len = bytes.len(), "received response");

        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                body: serde_json::from_slice(&bytes).ok(),
            });
        }
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| HttpError::Json(e.to_string()))
    }
}

impl Transport for HttpTransport {
    type Options = HttpOptions;
    type Error = HttpError;

    async fn get(&self, path: &str, options: HttpOptions) -> Result<Option<Value>, HttpError> {
        self.send(self.http.get(self.url(path)), options).await
    }

    async fn post(&self, path: &str, body: &Document, options: HttpOptions) -> Result<Option<Value>, HttpError> {
        let request = Self::with_body(self.http.post(self.url(path)), body)?;
        self.send(request, options).await
    }

    async fn patch(&self, path: &str, body: &Document, options: HttpOptions) -> Result<Option<Value>, HttpError> {
        let request = Self::with_body(self.http.patch(self.url(path)), body)?;
        self.send(request, options).await
    }

    async fn delete(&self, path: &str, options: HttpOptions) -> Result<Option<Value>, HttpError> {
        self.send(self.http.delete(self.url(path)), options).await
    }
}
