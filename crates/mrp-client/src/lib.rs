//! Mr Provisioner REST API Client
//!
//! A Rust client library for the Mr Provisioner ("MrP") baremetal
//! provisioning server. Uploads boot images and preseeds, and reads or sets
//! the provisioning and power state of machines.
//!
//! # Example
//!
//! ```no_run
//! use mrp_client::{HttpClient, StateControl, StateParams, DEFAULT_TIMEOUT};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http = HttpClient::new(
//!     "http://mrp:5000".to_string(),
//!     "your-api-token".to_string(),
//!     DEFAULT_TIMEOUT,
//! )?;
//!
//! let params = StateParams {
//!     arch: "arm64".to_string(),
//!     subarch: "efi".to_string(),
//!     initrd_desc: "debian-installer initrd".to_string(),
//!     kernel_desc: "debian-installer kernel".to_string(),
//!     ..Default::default()
//! };
//! StateControl::new(&http).provision("node01", &params).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Name resolution**: machines, images and preseeds are addressed by name
//! - **Uploads**: multipart image uploads and inline preseed uploads
//! - **State control**: boot configuration, provisioning and power
//! - **Interfaces**: IP, MAC and netmask of a machine's interfaces

pub mod common;
pub mod error;
pub mod image;
pub mod interface;
pub mod models;
#[path = "trait.rs"]
pub mod mrp_trait;
pub mod preseed;
pub mod resolve;
pub mod state;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use common::{DEFAULT_TIMEOUT, HttpClient};
pub use error::MrpError;
pub use image::ImageControl;
pub use interface::{DEFAULT_INTERFACE, InterfaceLookup};
pub use models::*;
pub use mrp_trait::{MrpTransport, MultipartUpload};
pub use preseed::PreseedControl;
pub use state::StateControl;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockTransport;
