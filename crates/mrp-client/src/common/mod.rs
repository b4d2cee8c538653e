//! Common utilities for the Mr Provisioner API client
//!
//! Provides the reqwest-backed transport shared by every controller.

pub mod query;

use crate::error::MrpError;
use crate::mrp_trait::{MrpTransport, MultipartUpload};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client wrapper with authentication
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new HTTP client
    ///
    /// # Arguments
    /// * `base_url` - MrP base URL (e.g., "http://mrp:5000")
    /// * `token` - API token for authentication
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: String, token: String, timeout: Duration) -> Result<Self, MrpError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, token))
    }

    /// Wrap an already configured reqwest client
    pub fn with_client(client: Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Get authorization header value
    ///
    /// MrP expects the token verbatim, without a scheme prefix.
    pub fn auth_header(&self) -> &str {
        &self.token
    }

    /// Attach credentials, send, and classify the response
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Value, MrpError> {
        let response = request
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MrpError::Transport {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().await?;
        decode_body(&body)
    }
}

#[async_trait::async_trait]
impl MrpTransport for HttpClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<Value, MrpError> {
        let url = self.build_url(path);
        debug!("GET {}", url);
        self.send(self.client.get(&url), &url).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, MrpError> {
        let url = self.build_url(path);
        debug!("POST {} with body: {}", url, body);
        self.send(self.client.post(&url).json(body), &url).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, MrpError> {
        let url = self.build_url(path);
        debug!("PUT {} with body: {}", url, body);
        self.send(self.client.put(&url).json(body), &url).await
    }

    async fn upload(&self, path: &str, upload: MultipartUpload) -> Result<Value, MrpError> {
        let url = self.build_url(path);
        debug!(
            "POST {} multipart: {} ({} bytes)",
            url,
            upload.file_name,
            upload.content.len()
        );

        let mut form = Form::new();
        for (name, value) in upload.fields {
            form = form.text(name, value);
        }
        let part = Part::bytes(upload.content).file_name(upload.file_name);
        form = form.part(upload.file_field, part);

        self.send(self.client.post(&url).multipart(form), &url).await
    }
}

/// Decode a response body, mapping an empty body to `Value::Null`
pub(crate) fn decode_body(body: &[u8]) -> Result<Value, MrpError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Convert a decoded body into a typed model
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, MrpError> {
    Ok(serde_json::from_value(value)?)
}
