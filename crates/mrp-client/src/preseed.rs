//! Preseed and kickstart management

use crate::error::MrpError;
use crate::models::{Preseed, PreseedPayload, PreseedType, PreseedUpload, Resolution};
use crate::mrp_trait::MrpTransport;
use crate::resolve;
use serde_json::Value;
use tracing::{debug, info};

const PRESEED_PATH: &str = "/api/v1/preseed";

/// Preseed operations against one server
#[derive(Clone, Copy)]
pub struct PreseedControl<'a> {
    transport: &'a dyn MrpTransport,
}

impl std::fmt::Debug for PreseedControl<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreseedControl")
            .field("base_url", &self.transport.base_url())
            .finish()
    }
}

impl<'a> PreseedControl<'a> {
    /// Create a preseed controller over a transport
    pub fn new(transport: &'a dyn MrpTransport) -> Self {
        Self { transport }
    }

    /// Upload a preseed file; its text is sent inline as `content`
    pub async fn upload(&self, request: &PreseedUpload) -> Result<Value, MrpError> {
        if request.name.is_empty() {
            return Err(MrpError::Configuration(
                "a preseed name is required for upload".to_string(),
            ));
        }
        if request.path.as_os_str().is_empty() {
            return Err(MrpError::Configuration(
                "a preseed path is required for upload".to_string(),
            ));
        }
        let preseed_type = request.preseed_type.ok_or_else(|| {
            MrpError::Configuration("a preseed type is required for upload".to_string())
        })?;

        let content = tokio::fs::read_to_string(&request.path)
            .await
            .map_err(|source| MrpError::Io {
                path: request.path.clone(),
                source,
            })?;

        let payload = PreseedPayload {
            name: request.name.clone(),
            preseed_type,
            description: request.description.clone(),
            known_good: request.known_good,
            public: request.public,
            content,
        };

        info!("Uploading {} \"{}\"", preseed_type, request.name);
        let created = self
            .transport
            .post(PRESEED_PATH, &serde_json::to_value(&payload)?)
            .await?;
        debug!("Preseed created: {}", created);
        Ok(created)
    }

    /// Look up a preseed by name and, optionally, type
    pub async fn check(
        &self,
        name: &str,
        preseed_type: Option<PreseedType>,
    ) -> Result<Resolution<Preseed>, MrpError> {
        resolve::resolve_preseed(self.transport, name, preseed_type).await
    }

    /// ID of the preseed with the given name
    pub async fn preseed_id(
        &self,
        name: &str,
        preseed_type: Option<PreseedType>,
    ) -> Result<u64, MrpError> {
        resolve::preseed_id(self.transport, name, preseed_type).await
    }
}
