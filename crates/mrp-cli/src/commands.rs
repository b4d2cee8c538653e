//! Command dispatch
//!
//! Runs one parsed subcommand against a transport and reports what the
//! process should exit with.

use crate::cli::{
    Command, ImageAction, InterfaceAction, InterfaceArgs, PreseedAction, StateAction, StateArgs,
};
use anyhow::{Context, Result};
use mrp_client::{
    ImageControl, ImageUpload, InterfaceLookup, MrpTransport, PreseedControl, PreseedUpload,
    Resolution, StateControl,
};
use serde_json::{Map, Value};
use std::io::Write;
use tracing::debug;

/// Exit code of a check that found nothing
pub const CHECK_FAILED_EXIT_CODE: i32 = 2;

/// How a successfully executed command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// A `check` found no unique match
    CheckFailed,
}

impl Outcome {
    /// Process exit code
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Done => 0,
            Outcome::CheckFailed => CHECK_FAILED_EXIT_CODE,
        }
    }
}

/// Execute a command, writing its output to `out`
pub async fn execute(
    command: &Command,
    transport: &dyn MrpTransport,
    out: &mut dyn Write,
) -> Result<Outcome> {
    match command {
        Command::Image(action) => image(action, transport, out).await,
        Command::Preseed(action) => preseed(action, transport, out).await,
        Command::State(args) => state(args, transport, out).await,
        Command::Interface(args) => interface(args, transport, out).await,
    }
}

async fn image(
    action: &ImageAction,
    transport: &dyn MrpTransport,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let images = ImageControl::new(transport);
    match action {
        ImageAction::Upload(args) => {
            let request = ImageUpload {
                image_type: args.image.image_type.into(),
                description: args.image.description.clone(),
                arch: args.image.arch.clone(),
                path: args.image_path.clone(),
                public: args.public,
                known_good: args.knowngood,
            };
            let created = images
                .upload(&request)
                .await
                .with_context(|| format!("uploading image {}", args.image_path.display()))?;
            debug!("{}", created);
            Ok(Outcome::Done)
        }
        ImageAction::Check(selector) => {
            let found = images
                .check(
                    selector.image_type.into(),
                    &selector.description,
                    &selector.arch,
                )
                .await?;
            report_check(&found, out)
        }
    }
}

async fn preseed(
    action: &PreseedAction,
    transport: &dyn MrpTransport,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let preseeds = PreseedControl::new(transport);
    match action {
        PreseedAction::Upload(args) => {
            let request = PreseedUpload {
                name: args.preseed.preseed_name.clone(),
                path: args.preseed_path.clone(),
                preseed_type: args.preseed.preseed_type.map(Into::into),
                description: args.description.clone(),
                public: args.public,
                known_good: args.knowngood,
            };
            let created = preseeds
                .upload(&request)
                .await
                .with_context(|| format!("uploading preseed {}", args.preseed_path.display()))?;
            debug!("{}", created);
            Ok(Outcome::Done)
        }
        PreseedAction::Check(selector) => {
            let found = preseeds
                .check(
                    &selector.preseed_name,
                    selector.preseed_type.map(Into::into),
                )
                .await?;
            report_check(&found, out)
        }
    }
}

async fn state(
    args: &StateArgs,
    transport: &dyn MrpTransport,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let control = StateControl::new(transport);
    let machine = args.machine.as_str();
    match &args.action {
        StateAction::Getparams => {
            let state = control.get_state(machine).await?;
            print_machine_state(&state, out)?;
        }
        StateAction::Setparams(params) => {
            let rc = control
                .set_state(machine, &params.boot.params(params.netboot))
                .await?;
            debug!("{}", rc);
        }
        StateAction::Provision(boot) => {
            let rc = control.provision(machine, &boot.params(true)).await?;
            debug!("{}", rc);
        }
        StateAction::Getpower => {
            let power = control.get_power_state(machine).await?;
            writeln!(out, "{power}")?;
        }
        StateAction::Setpower(power) => {
            let rc = control
                .set_power_state(machine, power.power_state.map(Into::into))
                .await?;
            debug!("{}", rc);
        }
    }
    Ok(Outcome::Done)
}

async fn interface(
    args: &InterfaceArgs,
    transport: &dyn MrpTransport,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let lookup = InterfaceLookup::new(transport);
    let (machine, identifier) = (args.machine.as_str(), args.interface.as_str());
    let value = match args.action {
        InterfaceAction::Ip => lookup.ip(machine, identifier).await?,
        InterfaceAction::Mac => Some(lookup.mac(machine, identifier).await?),
        InterfaceAction::Netmask => lookup.netmask(machine, identifier).await?,
    };
    writeln!(out, "{}", value.unwrap_or_default())?;
    Ok(Outcome::Done)
}

fn report_check<T>(found: &Resolution<T>, out: &mut dyn Write) -> Result<Outcome> {
    if let Resolution::Ambiguous(n) = found {
        debug!("check matched {} entries", n);
    }
    if found.is_found() {
        writeln!(out, "True")?;
        Ok(Outcome::Done)
    } else {
        writeln!(out, "False")?;
        Ok(Outcome::CheckFailed)
    }
}

fn print_machine_state(state: &Map<String, Value>, out: &mut dyn Write) -> Result<()> {
    for (key, value) in state {
        match value {
            Value::String(s) => writeln!(out, "{key}: {s}")?,
            other => writeln!(out, "{key}: {other}")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use mrp_client::mock::MockTransport;
    use mrp_client::{ImageType, Interface, MrpError, PreseedType};
    use serde_json::json;

    const CREDS: [&str; 5] = ["mrp", "--mrp-url", "http://mrp:5000", "--mrp-token", "t0k"];

    fn command(args: &[&str]) -> Command {
        Cli::try_parse_from(CREDS.iter().chain(args.iter()))
            .unwrap_or_else(|e| panic!("{e}"))
            .command
    }

    async fn run(mock: &MockTransport, args: &[&str]) -> (Result<Outcome>, String) {
        let mut out = Vec::new();
        let result = execute(&command(args), mock, &mut out).await;
        (result, String::from_utf8_lossy(&out).into_owned())
    }

    fn lab() -> MockTransport {
        let mock = MockTransport::new("http://mrp:5000");
        mock.add_machine_json(json!({
            "id": 42,
            "name": "node01",
            "arch": "arm64",
            "netboot_enabled": false,
        }));
        mock.add_image(10, ImageType::Initrd, "di-initrd", "arm64");
        mock.add_image(11, ImageType::Kernel, "di-kernel", "arm64");
        mock.add_preseed(20, "auto", PreseedType::Preseed);
        mock
    }

    #[tokio::test]
    async fn test_image_check_found_prints_true() {
        let mock = lab();
        let (result, out) = run(
            &mock,
            &["image", "check", "--image-type", "kernel", "--description", "di-kernel", "--arch", "arm64"],
        )
        .await;
        assert_eq!(result.ok(), Some(Outcome::Done));
        assert_eq!(out, "True\n");
    }

    #[tokio::test]
    async fn test_image_check_missing_exits_two() {
        let mock = lab();
        let (result, out) = run(
            &mock,
            &["image", "check", "--image-type", "kernel", "--description", "di-kernel", "--arch", "x86_64"],
        )
        .await;
        let outcome = result.unwrap_or_else(|e| panic!("{e:#}"));
        assert_eq!(outcome, Outcome::CheckFailed);
        assert_eq!(outcome.exit_code(), 2);
        assert_eq!(out, "False\n");
    }

    #[tokio::test]
    async fn test_preseed_check_ambiguous_is_false() {
        let mock = lab();
        mock.add_preseed(21, "auto", PreseedType::Kickstart);
        let (result, out) = run(&mock, &["preseed", "check", "--preseed-name", "auto"]).await;
        assert_eq!(result.ok(), Some(Outcome::CheckFailed));
        assert_eq!(out, "False\n");
    }

    #[tokio::test]
    async fn test_preseed_upload_from_file() {
        let mock = lab();
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("tempfile: {e}"));
        writeln!(file, "install").unwrap_or_else(|e| panic!("write: {e}"));
        let path = file.path().to_string_lossy().into_owned();

        let (result, _) = run(
            &mock,
            &["preseed", "upload", "--preseed-name", "ks", "--type", "kickstart", "--preseed-path", &path],
        )
        .await;
        assert_eq!(result.ok(), Some(Outcome::Done));
        assert!(mock.preseeds().iter().any(|p| p["name"] == "ks" && p["type"] == "kickstart"));
    }

    #[tokio::test]
    async fn test_getparams_prints_key_values() {
        let mock = lab();
        let (result, out) = run(&mock, &["state", "--machine", "node01", "getparams"]).await;
        assert_eq!(result.ok(), Some(Outcome::Done));
        assert!(out.contains("name: node01\n"));
        assert!(out.contains("id: 42\n"));
        assert!(out.contains("netboot_enabled: false\n"));
    }

    #[tokio::test]
    async fn test_getparams_keeps_server_field_order() {
        let mock = MockTransport::new("http://mrp:5000");
        mock.add_machine_json(json!({
            "name": "node02",
            "id": 43,
            "subarch": "efi",
            "arch": "arm64",
        }));
        let (result, out) = run(&mock, &["state", "--machine", "node02", "getparams"]).await;
        assert_eq!(result.ok(), Some(Outcome::Done));
        assert_eq!(out, "name: node02\nid: 43\nsubarch: efi\narch: arm64\n");
    }

    #[tokio::test]
    async fn test_provision_then_getpower() {
        let mock = lab();
        let (result, _) = run(
            &mock,
            &[
                "state", "--machine", "node01", "provision", "--arch", "arm64", "--subarch", "efi",
                "--initrd-desc", "di-initrd", "--kernel-desc", "di-kernel", "--preseed-name", "auto",
            ],
        )
        .await;
        assert_eq!(result.ok(), Some(Outcome::Done));
        let machine = mock.machine(42).unwrap_or_default();
        assert_eq!(machine["netboot_enabled"], true);
        assert_eq!(machine["preseed_id"], 20);
        assert_eq!(machine["state"], "provision");

        mock.set_power(42, "on");
        let (_, out) = run(&mock, &["state", "--machine", "node01", "getpower"]).await;
        assert_eq!(out, "on\n");
    }

    #[tokio::test]
    async fn test_setparams_missing_arch_is_error() {
        let mock = lab();
        let (result, _) = run(
            &mock,
            &["state", "--machine", "node01", "setparams", "--initrd-desc", "di-initrd", "--kernel-desc", "di-kernel"],
        )
        .await;
        let err = result.err().unwrap_or_else(|| panic!("expected an error"));
        assert!(matches!(
            err.downcast_ref::<MrpError>(),
            Some(MrpError::Configuration(_))
        ));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_setpower_without_state_is_error() {
        let mock = lab();
        let (result, _) = run(&mock, &["state", "--machine", "node01", "setpower"]).await;
        assert!(result.is_err());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_interface_mac() {
        let mock = lab();
        mock.add_interface(
            42,
            &Interface {
                identifier: "eth1".to_string(),
                mac: Some("aa:bb".to_string()),
                lease_ipv4: Some("10.0.0.5".to_string()),
                netmaskv4: Some("255.255.255.0".to_string()),
            },
        );
        let (result, out) = run(&mock, &["interface", "--machine", "node01", "mac"]).await;
        assert_eq!(result.ok(), Some(Outcome::Done));
        assert_eq!(out, "aa:bb\n");
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mock = lab();
        mock.fail_on("GET", "/api/v1/machine", 401);
        let (result, out) = run(&mock, &["state", "--machine", "node01", "getpower"]).await;
        assert!(out.is_empty());
        let err = result.err().unwrap_or_else(|| panic!("expected an error"));
        assert!(err.to_string().contains("401 Unauthorized"));
    }
}
