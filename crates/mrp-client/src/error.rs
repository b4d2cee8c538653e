//! Mr Provisioner client errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to the Mr Provisioner API
#[derive(Debug, Error)]
pub enum MrpError {
    /// Missing or invalid parameters, detected before any request is sent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A name or description did not resolve to exactly one server-side ID
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// The server answered with a status outside 200-299
    #[error("Error fetching {url}, HTTP {status} {reason}")]
    Transport {
        /// Full URL of the failed request
        url: String,
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase of the status
        reason: String,
    },

    /// The server returned an empty collection where a resource was expected
    #[error("No resource with the given identifier: {0}")]
    EmptyResource(String),

    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a local artifact failed
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MrpError {
    /// Whether the error means "the thing asked for does not exist"
    pub fn is_not_found(&self) -> bool {
        match self {
            MrpError::Resolution(_) | MrpError::EmptyResource(_) => true,
            MrpError::Transport { status, .. } => *status == 404,
            _ => false,
        }
    }
}
