//! Name resolution
//!
//! Maps human-readable names and descriptions to the IDs the server assigns.
//! Each lookup costs one listing round-trip; nothing is cached.

use crate::common::query::{SHOW_ALL, query_resources};
use crate::error::MrpError;
use crate::models::{Image, ImageType, Machine, Preseed, PreseedType, Resolution};
use crate::mrp_trait::MrpTransport;
use tracing::debug;

fn require_non_empty(value: &str, what: &str) -> Result<(), MrpError> {
    if value.is_empty() {
        return Err(MrpError::Configuration(format!("{what} must not be empty")));
    }
    Ok(())
}

/// Look up a machine by exact name
pub async fn resolve_machine(
    transport: &dyn MrpTransport,
    name: &str,
) -> Result<Resolution<Machine>, MrpError> {
    require_non_empty(name, "machine name")?;
    let machines: Vec<Machine> = query_resources(transport, "machine", SHOW_ALL).await?;
    let matches: Vec<Machine> = machines.into_iter().filter(|m| m.name == name).collect();
    debug!("machine \"{}\" matched {} entries", name, matches.len());
    Ok(Resolution::from_matches(matches))
}

/// Look up an image by description, type and architecture
pub async fn resolve_image(
    transport: &dyn MrpTransport,
    description: &str,
    image_type: ImageType,
    arch: &str,
) -> Result<Resolution<Image>, MrpError> {
    require_non_empty(description, "image description")?;
    require_non_empty(arch, "image architecture")?;
    let images: Vec<Image> = query_resources(transport, "image", SHOW_ALL).await?;
    let matches: Vec<Image> = images
        .into_iter()
        .filter(|i| {
            i.image_type == image_type
                && i.arch.as_deref() == Some(arch)
                && i.description == description
        })
        .collect();
    debug!(
        "{} image \"{}\" ({}) matched {} entries",
        image_type,
        description,
        arch,
        matches.len()
    );
    Ok(Resolution::from_matches(matches))
}

/// Look up a preseed by name, optionally restricted to one type
pub async fn resolve_preseed(
    transport: &dyn MrpTransport,
    name: &str,
    preseed_type: Option<PreseedType>,
) -> Result<Resolution<Preseed>, MrpError> {
    require_non_empty(name, "preseed name")?;
    let preseeds: Vec<Preseed> = query_resources(transport, "preseed", SHOW_ALL).await?;
    let matches: Vec<Preseed> = preseeds
        .into_iter()
        .filter(|p| p.name == name && preseed_type.is_none_or(|t| p.preseed_type == t))
        .collect();
    debug!("preseed \"{}\" matched {} entries", name, matches.len());
    Ok(Resolution::from_matches(matches))
}

/// ID of the machine with the given name
pub async fn machine_id(transport: &dyn MrpTransport, name: &str) -> Result<u64, MrpError> {
    resolve_machine(transport, name)
        .await?
        .map(|m| m.id)
        .required(format_args!("machine named \"{name}\""))
}

/// ID of the image matching description, type and architecture
pub async fn image_id(
    transport: &dyn MrpTransport,
    description: &str,
    image_type: ImageType,
    arch: &str,
) -> Result<u64, MrpError> {
    resolve_image(transport, description, image_type, arch)
        .await?
        .map(|i| i.id)
        .required(format_args!(
            "{image_type} image \"{description}\" for arch {arch}"
        ))
}

/// ID of the preseed with the given name
pub async fn preseed_id(
    transport: &dyn MrpTransport,
    name: &str,
    preseed_type: Option<PreseedType>,
) -> Result<u64, MrpError> {
    resolve_preseed(transport, name, preseed_type)
        .await?
        .map(|p| p.id)
        .required(format_args!("preseed named \"{name}\""))
}
