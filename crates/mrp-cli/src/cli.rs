//! Command-line arguments

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use mrp_client::{DEFAULT_INTERFACE, ImageType, PowerState, PreseedType, StateParams};
use std::path::PathBuf;

/// Client to the Mr Provisioner server for provisioning baremetal machines
#[derive(Parser, Debug)]
#[command(name = "mrp", author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity of logging output (repeat for more)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// URL of the MrP server
    #[arg(long, env = "MRP_URL")]
    pub mrp_url: String,

    /// Authentication token to use
    #[arg(long, env = "MRP_TOKEN", hide_env_values = true)]
    pub mrp_token: String,

    /// Request timeout in seconds
    #[arg(long, env = "MRP_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that an image is on MrP, or upload it
    #[command(subcommand)]
    Image(ImageAction),
    /// Check that a preseed is on MrP, or upload it
    #[command(subcommand)]
    Preseed(PreseedAction),
    /// Read or change the state of a machine
    State(StateArgs),
    /// Read addressing details of a machine's network interface
    Interface(InterfaceArgs),
}

#[derive(Subcommand, Debug)]
pub enum ImageAction {
    /// Exit 0 and print True if the image exists, otherwise print False and exit 2
    Check(ImageSelector),
    /// Upload an image file
    Upload(ImageUploadArgs),
}

#[derive(Args, Debug)]
pub struct ImageSelector {
    /// Type of the image
    #[arg(long, value_enum)]
    pub image_type: ImageKind,
    /// Description of the image in MrP
    #[arg(long)]
    pub description: String,
    /// Compatible architecture
    #[arg(long)]
    pub arch: String,
}

#[derive(Args, Debug)]
pub struct ImageUploadArgs {
    #[command(flatten)]
    pub image: ImageSelector,
    /// Path to the image file to upload
    #[arg(long)]
    pub image_path: PathBuf,
    /// Switch the public flag on
    #[arg(long)]
    pub public: bool,
    /// Switch the known good flag on
    #[arg(long)]
    pub knowngood: bool,
}

#[derive(Subcommand, Debug)]
pub enum PreseedAction {
    /// Exit 0 and print True if the preseed exists, otherwise print False and exit 2
    Check(PreseedSelector),
    /// Upload a preseed or kickstart file
    Upload(PreseedUploadArgs),
}

#[derive(Args, Debug)]
pub struct PreseedSelector {
    /// Name of the preseed in MrP
    #[arg(long)]
    pub preseed_name: String,
    /// Type of the preseed file
    #[arg(long = "type", value_enum)]
    pub preseed_type: Option<PreseedKind>,
}

#[derive(Args, Debug)]
pub struct PreseedUploadArgs {
    #[command(flatten)]
    pub preseed: PreseedSelector,
    /// Path to the preseed file
    #[arg(long)]
    pub preseed_path: PathBuf,
    /// Description of the preseed file in MrP
    #[arg(long, default_value = "")]
    pub description: String,
    /// Switch the public flag on
    #[arg(long)]
    pub public: bool,
    /// Switch the known good flag on
    #[arg(long)]
    pub knowngood: bool,
}

#[derive(Args, Debug)]
pub struct StateArgs {
    /// Name of the machine
    #[arg(long)]
    pub machine: String,
    #[command(subcommand)]
    pub action: StateAction,
}

#[derive(Subcommand, Debug)]
pub enum StateAction {
    /// Print the machine's parameters
    Getparams,
    /// Set kernel, initrd, preseed and netboot parameters
    Setparams(SetParamsArgs),
    /// Enable netboot with the given parameters and PXE boot the machine
    Provision(BootArgs),
    /// Print the machine's power state
    Getpower,
    /// Change the machine's power state
    Setpower(SetPowerArgs),
}

#[derive(Args, Debug)]
pub struct BootArgs {
    /// Architecture of the machine as in MrP
    #[arg(long, default_value = "")]
    pub arch: String,
    /// Subarchitecture of the machine as in MrP
    #[arg(long, default_value = "")]
    pub subarch: String,
    /// Description of the initrd to use
    #[arg(long, default_value = "")]
    pub initrd_desc: String,
    /// Description of the kernel to use
    #[arg(long, default_value = "")]
    pub kernel_desc: String,
    /// Kernel options to use
    #[arg(long, default_value = "")]
    pub kernel_opts: String,
    /// Name of the preseed to use
    #[arg(long)]
    pub preseed_name: Option<String>,
}

impl BootArgs {
    /// Convert into per-call state parameters
    pub fn params(&self, netboot: bool) -> StateParams {
        StateParams {
            arch: self.arch.clone(),
            subarch: self.subarch.clone(),
            initrd_desc: self.initrd_desc.clone(),
            kernel_desc: self.kernel_desc.clone(),
            kernel_opts: self.kernel_opts.clone(),
            preseed_name: self.preseed_name.clone(),
            netboot,
        }
    }
}

#[derive(Args, Debug)]
pub struct SetParamsArgs {
    #[command(flatten)]
    pub boot: BootArgs,
    /// Switch the netboot enabled flag on
    #[arg(long)]
    pub netboot: bool,
}

#[derive(Args, Debug)]
pub struct SetPowerArgs {
    /// Desired power state
    #[arg(long, value_enum)]
    pub power_state: Option<PowerArg>,
}

#[derive(Args, Debug)]
pub struct InterfaceArgs {
    /// Name of the machine
    #[arg(long)]
    pub machine: String,
    /// Identifier of the interface
    #[arg(long, default_value = DEFAULT_INTERFACE)]
    pub interface: String,
    #[command(subcommand)]
    pub action: InterfaceAction,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceAction {
    /// Print the IPv4 lease
    Ip,
    /// Print the MAC address
    Mac,
    /// Print the IPv4 netmask
    Netmask,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Initrd,
    Kernel,
    Bootloader,
}

impl From<ImageKind> for ImageType {
    fn from(kind: ImageKind) -> Self {
        match kind {
            ImageKind::Initrd => ImageType::Initrd,
            ImageKind::Kernel => ImageType::Kernel,
            ImageKind::Bootloader => ImageType::Bootloader,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreseedKind {
    Preseed,
    Kickstart,
}

impl From<PreseedKind> for PreseedType {
    fn from(kind: PreseedKind) -> Self {
        match kind {
            PreseedKind::Preseed => PreseedType::Preseed,
            PreseedKind::Kickstart => PreseedType::Kickstart,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "snake_case")]
pub enum PowerArg {
    On,
    Off,
    Reboot,
    PxeReboot,
    BiosReboot,
    DiskReboot,
}

impl From<PowerArg> for PowerState {
    fn from(arg: PowerArg) -> Self {
        match arg {
            PowerArg::On => PowerState::On,
            PowerArg::Off => PowerState::Off,
            PowerArg::Reboot => PowerState::Reboot,
            PowerArg::PxeReboot => PowerState::PxeReboot,
            PowerArg::BiosReboot => PowerState::BiosReboot,
            PowerArg::DiskReboot => PowerState::DiskReboot,
        }
    }
}
