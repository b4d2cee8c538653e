//! Query utilities for the Mr Provisioner API
//!
//! MrP collections are list-and-filter: there is no lookup by name, so every
//! resolution lists a collection and filters client-side.

use crate::common::decode;
use crate::error::MrpError;
use crate::mrp_trait::MrpTransport;
use serde::de::DeserializeOwned;

/// Filters applied to every collection listing
pub const SHOW_ALL: &[(&str, &str)] = &[("show_all", "true")];

/// Build query string from filters
pub fn build_query_string(filters: &[(&str, &str)]) -> String {
    filters
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build a collection path with an optional query string
pub fn collection_path(endpoint: &str, filters: &[(&str, &str)]) -> String {
    let path = format!("/api/v1/{endpoint}");
    if filters.is_empty() {
        path
    } else {
        format!("{}?{}", path, build_query_string(filters))
    }
}

/// List every resource of a collection
pub async fn query_resources<T: DeserializeOwned>(
    transport: &dyn MrpTransport,
    endpoint: &str,
    filters: &[(&str, &str)],
) -> Result<Vec<T>, MrpError> {
    let value = transport.get(&collection_path(endpoint, filters)).await?;
    if value.is_null() {
        return Ok(Vec::new());
    }
    decode(value)
}
