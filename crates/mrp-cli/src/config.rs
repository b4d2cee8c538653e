//! Client configuration
//!
//! Credentials and transport settings come from flags or the `MRP_*`
//! environment variables; they are checked here before any request is sent.

use crate::cli::Cli;
use mrp_client::{HttpClient, MrpError};
use std::time::Duration;

/// Connection settings for one invocation
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub url: String,
    pub token: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Settings taken from parsed arguments
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            url: cli.mrp_url.trim().to_string(),
            token: cli.mrp_token.clone(),
            timeout: Duration::from_secs(cli.timeout),
        }
    }

    /// Reject settings that cannot possibly reach a server
    pub fn validate(&self) -> Result<(), MrpError> {
        if self.url.is_empty() {
            return Err(MrpError::Configuration("the MrP URL is required".to_string()));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(MrpError::Configuration(format!(
                "the MrP URL must start with http:// or https://, got \"{}\"",
                self.url
            )));
        }
        if self.token.is_empty() {
            return Err(MrpError::Configuration("the MrP token is required".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(MrpError::Configuration("the timeout must be positive".to_string()));
        }
        Ok(())
    }

    /// Validate, then build the HTTP transport
    pub fn connect(&self) -> Result<HttpClient, MrpError> {
        self.validate()?;
        HttpClient::new(self.url.clone(), self.token.clone(), self.timeout)
    }
}
