//! Mock MrpTransport for unit testing
//!
//! This module provides an in-memory emulation of the Mr Provisioner REST
//! surface that can be used in unit tests without a running server. Every
//! request is recorded so tests can assert on what was (or was not) sent.

use crate::error::MrpError;
use crate::models::{ImageType, Interface, PreseedType};
use crate::mrp_trait::{MrpTransport, MultipartUpload};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A request seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// HTTP method
    pub method: &'static str,
    /// Path including the query string
    pub path: String,
    /// JSON body, if the request carried one
    pub body: Option<Value>,
}

#[derive(Debug)]
struct MockState {
    machines: BTreeMap<u64, Map<String, Value>>,
    interfaces: HashMap<u64, Vec<Value>>,
    power: HashMap<u64, String>,
    images: Vec<Value>,
    preseeds: Vec<Value>,
    uploads: Vec<MultipartUpload>,
    failures: HashMap<(&'static str, String), u16>,
    calls: Vec<RecordedCall>,
    next_id: u64,
}

/// Mock transport for testing
///
/// This mock stores resources in memory and can be configured to fail
/// specific requests for testing error paths.
#[derive(Debug, Clone)]
pub struct MockTransport {
    base_url: String,
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            state: Arc::new(Mutex::new(MockState {
                machines: BTreeMap::new(),
                interfaces: HashMap::new(),
                power: HashMap::new(),
                images: Vec::new(),
                preseeds: Vec::new(),
                uploads: Vec::new(),
                failures: HashMap::new(),
                calls: Vec::new(),
                next_id: 1000,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a machine with only an ID and a name (for test setup)
    pub fn add_machine(&self, id: u64, name: &str) {
        self.add_machine_json(json!({ "id": id, "name": name }));
    }

    /// Add a machine from its full JSON representation (for test setup)
    ///
    /// The object must carry a numeric `id`.
    pub fn add_machine_json(&self, machine: Value) {
        if let Value::Object(object) = machine {
            if let Some(id) = object.get("id").and_then(Value::as_u64) {
                self.state().machines.insert(id, object);
            }
        }
    }

    /// Add an image (for test setup)
    pub fn add_image(&self, id: u64, image_type: ImageType, description: &str, arch: &str) {
        self.state().images.push(json!({
            "id": id,
            "description": description,
            "type": image_type,
            "arch": arch,
            "public": false,
            "known_good": false,
        }));
    }

    /// Add a preseed (for test setup)
    pub fn add_preseed(&self, id: u64, name: &str, preseed_type: PreseedType) {
        self.state().preseeds.push(json!({
            "id": id,
            "name": name,
            "type": preseed_type,
            "description": "",
            "public": false,
            "known_good": false,
        }));
    }

    /// Attach a network interface to a machine (for test setup)
    pub fn add_interface(&self, machine_id: u64, interface: &Interface) {
        let value = serde_json::to_value(interface).unwrap_or(Value::Null);
        self.state()
            .interfaces
            .entry(machine_id)
            .or_default()
            .push(value);
    }

    /// Set the power state reported for a machine (for test setup)
    pub fn set_power(&self, machine_id: u64, state: &str) {
        self.state().power.insert(machine_id, state.to_string());
    }

    /// Make every `method` request to `path` (query ignored) fail with `status`
    pub fn fail_on(&self, method: &'static str, path: &str, status: u16) {
        self.state()
            .failures
            .insert((method, path.to_string()), status);
    }

    /// All requests received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Current JSON representation of a machine
    pub fn machine(&self, id: u64) -> Option<Value> {
        self.state().machines.get(&id).cloned().map(Value::Object)
    }

    /// Reported power state of a machine
    pub fn power(&self, id: u64) -> Option<String> {
        self.state().power.get(&id).cloned()
    }

    /// Multipart uploads received so far
    pub fn uploads(&self) -> Vec<MultipartUpload> {
        self.state().uploads.clone()
    }

    /// Preseeds currently stored
    pub fn preseeds(&self) -> Vec<Value> {
        self.state().preseeds.clone()
    }

    fn handle(
        &self,
        method: &'static str,
        path: &str,
        body: Option<&Value>,
        upload: Option<MultipartUpload>,
    ) -> Result<Value, MrpError> {
        let mut state = self.state();
        state.calls.push(RecordedCall {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });

        let route = path.split('?').next().unwrap_or(path);
        let url = format!("{}{}", self.base_url, path);
        if let Some(status) = state.failures.get(&(method, route.to_string())) {
            return Err(transport_error(url, *status));
        }

        let segments: Vec<&str> = route
            .trim_start_matches("/api/v1/")
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match (method, segments.as_slice()) {
            ("GET", ["machine"]) => Ok(Value::Array(
                state.machines.values().cloned().map(Value::Object).collect(),
            )),
            ("GET", ["machine", id]) => {
                let id = parse_id(id, &url)?;
                state
                    .machines
                    .get(&id)
                    .cloned()
                    .map(Value::Object)
                    .ok_or_else(|| transport_error(url, 404))
            }
            ("PUT", ["machine", id]) => {
                let id = parse_id(id, &url)?;
                let machine = state
                    .machines
                    .get_mut(&id)
                    .ok_or_else(|| transport_error(url.clone(), 404))?;
                match body {
                    Some(Value::Object(fields)) => {
                        for (key, value) in fields {
                            machine.insert(key.clone(), value.clone());
                        }
                        Ok(Value::Object(machine.clone()))
                    }
                    _ => Err(transport_error(url, 400)),
                }
            }
            ("POST", ["machine", id, "state"]) => {
                let id = parse_id(id, &url)?;
                let requested = body
                    .and_then(|b| b.get("state"))
                    .cloned()
                    .ok_or_else(|| transport_error(url.clone(), 400))?;
                let machine = state
                    .machines
                    .get_mut(&id)
                    .ok_or_else(|| transport_error(url, 404))?;
                machine.insert("state".to_string(), requested.clone());
                Ok(json!({ "state": requested }))
            }
            ("GET", ["machine", id, "power"]) => {
                let id = parse_id(id, &url)?;
                if !state.machines.contains_key(&id) {
                    return Err(transport_error(url, 404));
                }
                let power = state.power.get(&id).cloned().unwrap_or_else(|| "unknown".to_string());
                Ok(json!({ "state": power }))
            }
            ("POST", ["machine", id, "power"]) => {
                let id = parse_id(id, &url)?;
                if !state.machines.contains_key(&id) {
                    return Err(transport_error(url, 404));
                }
                let requested = body
                    .and_then(|b| b.get("state"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| transport_error(url.clone(), 400))?
                    .to_string();
                state.power.insert(id, requested.clone());
                Ok(json!({ "state": requested }))
            }
            ("GET", ["machine", id, "interface"]) => {
                let id = parse_id(id, &url)?;
                if !state.machines.contains_key(&id) {
                    return Err(transport_error(url, 404));
                }
                Ok(Value::Array(
                    state.interfaces.get(&id).cloned().unwrap_or_default(),
                ))
            }
            ("GET", ["image"]) => Ok(Value::Array(state.images.clone())),
            ("POST", ["image"]) => {
                let upload = upload.ok_or_else(|| transport_error(url.clone(), 400))?;
                let metadata = upload
                    .fields
                    .iter()
                    .find(|(name, _)| name == "q")
                    .and_then(|(_, value)| serde_json::from_str::<Value>(value).ok());
                let Some(Value::Object(mut image)) = metadata else {
                    return Err(transport_error(url, 400));
                };
                let id = state.next_id;
                state.next_id += 1;
                image.insert("id".to_string(), json!(id));
                let image = Value::Object(image);
                state.images.push(image.clone());
                state.uploads.push(upload);
                Ok(image)
            }
            ("GET", ["preseed"]) => Ok(Value::Array(state.preseeds.clone())),
            ("POST", ["preseed"]) => {
                let Some(Value::Object(fields)) = body else {
                    return Err(transport_error(url, 400));
                };
                let id = state.next_id;
                state.next_id += 1;
                let mut preseed = fields.clone();
                preseed.insert("id".to_string(), json!(id));
                let preseed = Value::Object(preseed);
                state.preseeds.push(preseed.clone());
                Ok(preseed)
            }
            _ => Err(transport_error(url, 404)),
        }
    }
}

fn parse_id(segment: &str, url: &str) -> Result<u64, MrpError> {
    segment
        .parse()
        .map_err(|_| transport_error(url.to_string(), 404))
}

fn transport_error(url: String, status: u16) -> MrpError {
    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
        .to_string();
    MrpError::Transport {
        url,
        status,
        reason,
    }
}

#[async_trait::async_trait]
impl MrpTransport for MockTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<Value, MrpError> {
        self.handle("GET", path, None, None)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, MrpError> {
        self.handle("POST", path, Some(body), None)
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, MrpError> {
        self.handle("PUT", path, Some(body), None)
    }

    async fn upload(&self, path: &str, upload: MultipartUpload) -> Result<Value, MrpError> {
        self.handle("POST", path, None, Some(upload))
    }
}
