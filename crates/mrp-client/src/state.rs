//! Machine provisioning and power state
//!
//! The orchestrator of the client: resolves image and preseed names to IDs,
//! builds the machine configuration and issues the state-change requests.
//! Parameters are passed per call; nothing is cached between calls.

use crate::common::decode;
use crate::error::MrpError;
use crate::image::ImageControl;
use crate::models::{ImageType, MachineConfig, PowerState, StateParams};
use crate::mrp_trait::MrpTransport;
use crate::preseed::PreseedControl;
use crate::resolve;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

fn machine_path(id: u64) -> String {
    format!("/api/v1/machine/{id}")
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    state: String,
}

/// Machine state operations against one server
#[derive(Clone, Copy)]
pub struct StateControl<'a> {
    transport: &'a dyn MrpTransport,
}

impl std::fmt::Debug for StateControl<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateControl")
            .field("base_url", &self.transport.base_url())
            .finish()
    }
}

impl<'a> StateControl<'a> {
    /// Create a state controller over a transport
    pub fn new(transport: &'a dyn MrpTransport) -> Self {
        Self { transport }
    }

    /// Full machine resource, exactly as the server returned it
    pub async fn get_state(&self, machine: &str) -> Result<Map<String, Value>, MrpError> {
        let id = resolve::machine_id(self.transport, machine).await?;
        match self.transport.get(&machine_path(id)).await? {
            Value::Object(state) => Ok(state),
            Value::Null => Err(MrpError::EmptyResource(format!("machine {id}"))),
            other => decode(other),
        }
    }

    /// Configure kernel, initrd, preseed and netboot for a machine
    ///
    /// Every name is resolved before anything is written, so a failed lookup
    /// never leaves a half-applied configuration.
    pub async fn set_state(&self, machine: &str, params: &StateParams) -> Result<Value, MrpError> {
        validate(params)?;
        let id = resolve::machine_id(self.transport, machine).await?;
        self.configure(id, params, params.netboot).await
    }

    /// Configure a machine with netboot enabled, then trigger a provisioning boot
    ///
    /// The two requests are independent: if the boot trigger fails the
    /// machine keeps its new configuration.
    pub async fn provision(&self, machine: &str, params: &StateParams) -> Result<Value, MrpError> {
        validate(params)?;
        let id = resolve::machine_id(self.transport, machine).await?;
        self.configure(id, params, true).await?;

        info!("Triggering provisioning boot of \"{}\" ({})", machine, id);
        self.transport
            .post(
                &format!("{}/state", machine_path(id)),
                &json!({ "state": "provision" }),
            )
            .await
    }

    /// Power state as reported by the server
    pub async fn get_power_state(&self, machine: &str) -> Result<String, MrpError> {
        let id = resolve::machine_id(self.transport, machine).await?;
        let power: PowerResponse =
            decode(self.transport.get(&format!("{}/power", machine_path(id))).await?)?;
        Ok(power.state)
    }

    /// Ask the server to move a machine into a power state
    pub async fn set_power_state(
        &self,
        machine: &str,
        state: Option<PowerState>,
    ) -> Result<Value, MrpError> {
        let state = state.ok_or_else(|| {
            MrpError::Configuration("a power state is required".to_string())
        })?;
        let id = resolve::machine_id(self.transport, machine).await?;

        info!("Setting power of \"{}\" ({}) to {}", machine, id, state);
        self.transport
            .post(
                &format!("{}/power", machine_path(id)),
                &json!({ "state": state }),
            )
            .await
    }

    async fn configure(
        &self,
        id: u64,
        params: &StateParams,
        netboot: bool,
    ) -> Result<Value, MrpError> {
        let images = ImageControl::new(self.transport);
        let initrd_id = images
            .image_id(ImageType::Initrd, &params.initrd_desc, &params.arch)
            .await?;
        let kernel_id = images
            .image_id(ImageType::Kernel, &params.kernel_desc, &params.arch)
            .await?;

        let preseed_id = match params.preseed() {
            Some(name) => Some(
                PreseedControl::new(self.transport)
                    .preseed_id(name, None)
                    .await?,
            ),
            None => None,
        };

        let config = MachineConfig {
            kernel_id,
            initrd_id,
            subarch: params.subarch.clone(),
            netboot_enabled: netboot,
            preseed_id,
            kernel_opts: (!params.kernel_opts.is_empty()).then(|| params.kernel_opts.clone()),
        };
        debug!("Machine {} configuration: {:?}", id, config);

        self.transport
            .put(&machine_path(id), &serde_json::to_value(&config)?)
            .await
    }
}

fn validate(params: &StateParams) -> Result<(), MrpError> {
    let missing: Vec<&str> = [
        ("arch", &params.arch),
        ("subarch", &params.subarch),
        ("initrd description", &params.initrd_desc),
        ("kernel description", &params.kernel_desc),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(name, _)| name)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MrpError::Configuration(format!(
            "Missing arguments for setting machine's state: {}",
            missing.join(", ")
        )))
    }
}
