//! Integration tests for the Mr Provisioner client
//!
//! These tests require a running MrP instance.
//! Set MRP_URL and MRP_TOKEN environment variables to run; MRP_MACHINE names
//! an existing machine for the read-only state queries.

use mrp_client::{
    DEFAULT_TIMEOUT, HttpClient, ImageControl, ImageType, InterfaceLookup, MrpError,
    MrpTransport, PreseedControl, Resolution, StateControl,
};

fn client() -> HttpClient {
    let url = std::env::var("MRP_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let token = std::env::var("MRP_TOKEN").expect("MRP_TOKEN environment variable must be set");

    HttpClient::new(url, token, DEFAULT_TIMEOUT).expect("Failed to create client")
}

fn machine() -> String {
    std::env::var("MRP_MACHINE").expect("MRP_MACHINE environment variable must be set")
}

#[tokio::test]
#[ignore] // Requires running MrP instance
async fn test_list_machines() {
    let http = client();
    let machines = http.get("/api/v1/machine?show_all=true").await;
    assert!(machines.is_ok(), "Failed to list machines");
}

#[tokio::test]
#[ignore]
async fn test_check_unknown_image() {
    let http = client();
    let found = ImageControl::new(&http)
        .check(ImageType::Kernel, "no-such-image-description", "arm64")
        .await
        .expect("Failed to list images");
    assert_eq!(found.map(|i| i.id), Resolution::NotFound);
}

#[tokio::test]
#[ignore]
async fn test_check_unknown_preseed() {
    let http = client();
    let found = PreseedControl::new(&http)
        .check("no-such-preseed", None)
        .await
        .expect("Failed to list preseeds");
    assert!(!found.is_found());
}

#[tokio::test]
#[ignore]
async fn test_get_state_and_power() {
    let http = client();
    let control = StateControl::new(&http);
    let name = machine();

    let state = control.get_state(&name).await.expect("Failed to get state");
    assert_eq!(state.get("name").and_then(|v| v.as_str()), Some(name.as_str()));

    let power = control.get_power_state(&name).await.expect("Failed to get power");
    println!("{name} power: {power}");
}

#[tokio::test]
#[ignore]
async fn test_list_interfaces() {
    let http = client();
    match InterfaceLookup::new(&http).interfaces(&machine()).await {
        Ok(interfaces) => {
            for interface in interfaces {
                println!("{}: {:?}", interface.identifier, interface.lease_ipv4);
            }
        }
        Err(MrpError::EmptyResource(msg)) => println!("No interfaces: {msg}"),
        Err(e) => panic!("Failed to list interfaces: {e}"),
    }
}

#[tokio::test]
#[ignore]
async fn test_bad_token_is_rejected() {
    let url = std::env::var("MRP_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let http = HttpClient::new(url, "invalid-token".to_string(), DEFAULT_TIMEOUT)
        .expect("Failed to create client");

    let result = StateControl::new(&http).get_state("anything").await;
    assert!(matches!(result, Err(MrpError::Transport { .. })));
}
