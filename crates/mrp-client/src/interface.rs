//! Network interface lookup
//!
//! Reads the interfaces of a machine and extracts addressing details of one
//! of them. Errors propagate like everywhere else in the client.

use crate::common::decode;
use crate::error::MrpError;
use crate::models::Interface;
use crate::mrp_trait::MrpTransport;
use crate::resolve;

/// Interface used when none is named
pub const DEFAULT_INTERFACE: &str = "eth1";

/// Interface queries against one server
#[derive(Clone, Copy)]
pub struct InterfaceLookup<'a> {
    transport: &'a dyn MrpTransport,
}

impl std::fmt::Debug for InterfaceLookup<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceLookup")
            .field("base_url", &self.transport.base_url())
            .finish()
    }
}

impl<'a> InterfaceLookup<'a> {
    /// Create an interface lookup over a transport
    pub fn new(transport: &'a dyn MrpTransport) -> Self {
        Self { transport }
    }

    /// All interfaces of a machine
    ///
    /// A machine that resolved but reports no interfaces is treated as
    /// missing.
    pub async fn interfaces(&self, machine: &str) -> Result<Vec<Interface>, MrpError> {
        let id = resolve::machine_id(self.transport, machine).await?;
        let value = self
            .transport
            .get(&format!("/api/v1/machine/{id}/interface"))
            .await?;
        let interfaces: Vec<Interface> = if value.is_null() {
            Vec::new()
        } else {
            decode(value)?
        };
        if interfaces.is_empty() {
            return Err(MrpError::EmptyResource(format!("no machine with id \"{id}\"")));
        }
        Ok(interfaces)
    }

    /// The interface with the given identifier
    pub async fn interface(&self, machine: &str, identifier: &str) -> Result<Interface, MrpError> {
        self.interfaces(machine)
            .await?
            .into_iter()
            .find(|i| i.identifier == identifier)
            .ok_or_else(|| {
                MrpError::Resolution(format!(
                    "machine \"{machine}\" has no interface \"{identifier}\""
                ))
            })
    }

    /// IPv4 lease of an interface, if it has one
    pub async fn ip(&self, machine: &str, identifier: &str) -> Result<Option<String>, MrpError> {
        Ok(self.interface(machine, identifier).await?.lease_ipv4)
    }

    /// MAC address of an interface
    pub async fn mac(&self, machine: &str, identifier: &str) -> Result<String, MrpError> {
        self.interface(machine, identifier).await?.mac.ok_or_else(|| {
            MrpError::Resolution(format!("interface \"{identifier}\" reports no MAC address"))
        })
    }

    /// IPv4 netmask of an interface, if it has one
    pub async fn netmask(&self, machine: &str, identifier: &str) -> Result<Option<String>, MrpError> {
        Ok(self.interface(machine, identifier).await?.netmaskv4)
    }
}
