//! MrpTransport trait for mocking
//!
//! This trait abstracts the HTTP layer so the controllers can be driven by
//! either the reqwest-backed [`HttpClient`](crate::HttpClient) or the
//! in-memory mock used in unit tests.

use crate::error::MrpError;
use serde_json::Value;

/// A file part plus text fields, sent as `multipart/form-data`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartUpload {
    /// Plain text form fields
    pub fields: Vec<(String, String)>,
    /// Form field name of the file part
    pub file_field: String,
    /// File name reported to the server
    pub file_name: String,
    /// Raw file content
    pub content: Vec<u8>,
}

/// Authenticated JSON verbs against the Mr Provisioner API
///
/// Paths are resolved against the configured base URL. Every method returns
/// the decoded response body, or `Value::Null` when the body is empty.
/// All async methods must be `Send` to work with Tokio's runtime.
#[async_trait::async_trait]
pub trait MrpTransport: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Make a GET request
    async fn get(&self, path: &str) -> Result<Value, MrpError>;

    /// Make a POST request with a JSON body
    async fn post(&self, path: &str, body: &Value) -> Result<Value, MrpError>;

    /// Make a PUT request with a JSON body
    async fn put(&self, path: &str, body: &Value) -> Result<Value, MrpError>;

    /// Make a multipart POST request
    async fn upload(&self, path: &str, upload: MultipartUpload) -> Result<Value, MrpError>;
}
