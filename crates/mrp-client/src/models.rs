//! Mr Provisioner API models
//!
//! These models match the JSON representations served under `/api/v1/`.
//! Unknown fields are ignored so newer servers stay compatible.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Machine as listed by `/api/v1/machine`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Server-assigned ID
    pub id: u64,
    /// Unique human-readable name
    pub name: String,
    #[serde(default)]
    pub arch: Option<String>,
    #[serde(default)]
    pub subarch: Option<String>,
    /// ID of the assigned kernel image
    #[serde(default)]
    pub kernel_id: Option<u64>,
    /// ID of the assigned initrd image
    #[serde(default)]
    pub initrd_id: Option<u64>,
    #[serde(default)]
    pub preseed_id: Option<u64>,
    /// Kernel command line
    #[serde(default)]
    pub kernel_opts: Option<String>,
    #[serde(default)]
    pub netboot_enabled: Option<bool>,
    /// Provisioning state
    #[serde(default)]
    pub state: Option<String>,
}

/// Kind of boot image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageType {
    Initrd,
    Kernel,
    Bootloader,
}

impl ImageType {
    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            ImageType::Initrd => "Initrd",
            ImageType::Kernel => "Kernel",
            ImageType::Bootloader => "Bootloader",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boot image as listed by `/api/v1/image`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Server-assigned ID
    pub id: u64,
    /// Human-readable description, used for lookups
    pub description: String,
    #[serde(rename = "type")]
    pub image_type: ImageType,
    #[serde(default)]
    pub arch: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub known_good: bool,
}

/// Kind of automated installation file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreseedType {
    Preseed,
    Kickstart,
}

impl PreseedType {
    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            PreseedType::Preseed => "preseed",
            PreseedType::Kickstart => "kickstart",
        }
    }
}

impl fmt::Display for PreseedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preseed or kickstart file as listed by `/api/v1/preseed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preseed {
    /// Server-assigned ID
    pub id: u64,
    /// Name used for lookups
    pub name: String,
    #[serde(rename = "type")]
    pub preseed_type: PreseedType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub known_good: bool,
}

/// Network interface of a machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    /// Interface name such as `eth1`; numbers are accepted and stringified
    #[serde(deserialize_with = "lenient_string")]
    pub identifier: String,
    /// MAC address
    #[serde(default)]
    pub mac: Option<String>,
    /// Leased IPv4 address
    #[serde(default)]
    pub lease_ipv4: Option<String>,
    /// IPv4 netmask
    #[serde(default)]
    pub netmaskv4: Option<String>,
}

/// Accept a JSON string or any scalar, rendered as a string
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

/// Power states a machine can be asked to enter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    On,
    Off,
    Reboot,
    PxeReboot,
    BiosReboot,
    DiskReboot,
}

impl PowerState {
    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            PowerState::On => "on",
            PowerState::Off => "off",
            PowerState::Reboot => "reboot",
            PowerState::PxeReboot => "pxe_reboot",
            PowerState::BiosReboot => "bios_reboot",
            PowerState::DiskReboot => "disk_reboot",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for configuring how a machine boots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateParams {
    /// Architecture, used to pick the kernel and initrd
    pub arch: String,
    pub subarch: String,
    /// Description of the initrd image
    pub initrd_desc: String,
    /// Description of the kernel image
    pub kernel_desc: String,
    /// Kernel command line; empty means "leave unchanged"
    pub kernel_opts: String,
    /// Name of the preseed to attach; `None` or empty means "no preseed"
    pub preseed_name: Option<String>,
    pub netboot: bool,
}

impl StateParams {
    /// Preseed name, if one was actually given
    pub fn preseed(&self) -> Option<&str> {
        self.preseed_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Body of `PUT /api/v1/machine/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    pub kernel_id: u64,
    pub initrd_id: u64,
    pub subarch: String,
    /// PXE boot the assigned kernel and initrd on next power cycle
    pub netboot_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preseed_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel_opts: Option<String>,
}

/// Image upload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub image_type: ImageType,
    pub description: String,
    pub arch: String,
    /// Local file to upload
    pub path: PathBuf,
    pub public: bool,
    pub known_good: bool,
}

/// Metadata sent alongside an image upload in the `q` form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub description: String,
    #[serde(rename = "type")]
    pub image_type: ImageType,
    pub arch: String,
    pub public: bool,
    pub known_good: bool,
}

/// Preseed upload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreseedUpload {
    pub name: String,
    /// Local file to upload
    pub path: PathBuf,
    /// Required; `None` is rejected before any request
    pub preseed_type: Option<PreseedType>,
    pub description: String,
    pub public: bool,
    pub known_good: bool,
}

/// Body of `POST /api/v1/preseed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreseedPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub preseed_type: PreseedType,
    pub description: String,
    pub known_good: bool,
    pub public: bool,
    /// File text, sent inline
    pub content: String,
}

/// Outcome of mapping a human-readable name to a server resource
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// Exactly one match
    Found(T),
    /// No match
    NotFound,
    /// More than one match; carries the match count
    Ambiguous(usize),
}

impl<T> Resolution<T> {
    /// Classify a list of candidates
    pub fn from_matches(mut matches: Vec<T>) -> Self {
        match matches.len() {
            0 => Resolution::NotFound,
            1 => matches.pop().map_or(Resolution::NotFound, Resolution::Found),
            n => Resolution::Ambiguous(n),
        }
    }

    /// Whether exactly one match was found
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    /// Map the found value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Found(value) => Resolution::Found(f(value)),
            Resolution::NotFound => Resolution::NotFound,
            Resolution::Ambiguous(n) => Resolution::Ambiguous(n),
        }
    }

    /// Turn anything but a unique match into a resolution error
    pub fn required(self, what: impl fmt::Display) -> Result<T, crate::MrpError> {
        match self {
            Resolution::Found(value) => Ok(value),
            Resolution::NotFound => Err(crate::MrpError::Resolution(format!("no {what}"))),
            Resolution::Ambiguous(n) => Err(crate::MrpError::Resolution(format!(
                "{n} matches for {what}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolution_from_matches() {
        assert_eq!(Resolution::<u64>::from_matches(vec![]), Resolution::NotFound);
        assert_eq!(Resolution::from_matches(vec![7]), Resolution::Found(7));
        assert_eq!(Resolution::from_matches(vec![7, 8, 9]), Resolution::Ambiguous(3));
    }

    #[test]
    fn test_resolution_required_messages() {
        let err = Resolution::<u64>::NotFound
            .required("machine named \"node01\"")
            .err()
            .map(|e| e.to_string());
        assert_eq!(
            err.as_deref(),
            Some("Resolution error: no machine named \"node01\"")
        );

        let err = Resolution::<u64>::Ambiguous(2).required("kernel").err();
        assert!(matches!(err, Some(crate::MrpError::Resolution(msg)) if msg == "2 matches for kernel"));
    }

    #[test]
    fn test_machine_config_omits_optional_keys() {
        let config = MachineConfig {
            kernel_id: 1,
            initrd_id: 2,
            subarch: "efi".to_string(),
            netboot_enabled: false,
            preseed_id: None,
            kernel_opts: None,
        };
        assert_eq!(
            serde_json::to_value(&config).ok(),
            Some(json!({
                "kernel_id": 1,
                "initrd_id": 2,
                "subarch": "efi",
                "netboot_enabled": false,
            }))
        );
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_value(ImageType::Initrd).ok(), Some(json!("Initrd")));
        assert_eq!(serde_json::to_value(PreseedType::Kickstart).ok(), Some(json!("kickstart")));
        assert_eq!(serde_json::to_value(PowerState::PxeReboot).ok(), Some(json!("pxe_reboot")));
        assert_eq!(PowerState::DiskReboot.to_string(), "disk_reboot");
    }

    #[test]
    fn test_machine_tolerates_unknown_fields() {
        let machine: Machine = serde_json::from_value(json!({
            "id": 42,
            "name": "node01",
            "bmc_id": 3,
            "netboot_enabled": true,
        }))
        .unwrap_or_else(|e| panic!("decode failed: {e}"));
        assert_eq!(machine.id, 42);
        assert_eq!(machine.netboot_enabled, Some(true));
        assert_eq!(machine.arch, None);
    }

    #[test]
    fn test_interface_numeric_identifier() {
        let interfaces: Vec<Interface> = serde_json::from_value(json!([
            {"identifier": 1, "mac": "aa:bb"},
            {"identifier": "eth1", "lease_ipv4": "10.0.0.5"},
        ]))
        .unwrap_or_else(|e| panic!("decode failed: {e}"));
        assert_eq!(interfaces[0].identifier, "1");
        assert_eq!(interfaces[1].identifier, "eth1");

        let missing: Result<Interface, _> = serde_json::from_value(json!({"identifier": null}));
        assert!(missing.is_err());
    }

    #[test]
    fn test_state_params_empty_preseed_is_none() {
        let mut params = StateParams::default();
        assert_eq!(params.preseed(), None);
        params.preseed_name = Some(String::new());
        assert_eq!(params.preseed(), None);
        params.preseed_name = Some("debian".to_string());
        assert_eq!(params.preseed(), Some("debian"));
    }
}
