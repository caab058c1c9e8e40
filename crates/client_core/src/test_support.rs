use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{
    domain::Device,
    protocol::{self, Config, Method, PreferredDevicesRequest, SaveConfigRequest},
};

use crate::{
    controls::HeadlessSurface,
    error::TransportError,
    panel::{Panel, PanelOptions},
    transport::{HttpRequest, HttpResponse, Transport},
};

pub(crate) const DEFAULT_SAVE_PATH: &str = "/home/operator/.config/keyball-gestures/config.toml";

type Route = (Method, String);

struct FakeState {
    running: bool,
    status_override: Option<String>,
    health: String,
    config: Config,
    devices: Option<Vec<Device>>,
    default_latency: Duration,
    latencies: HashMap<Route, VecDeque<Duration>>,
    failures: HashMap<Route, VecDeque<HttpResponse>>,
    offline: bool,
    log: Vec<HttpRequest>,
}

pub(crate) struct FakeService {
    state: Mutex<FakeState>,
}

impl FakeService {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                running: false,
                status_override: None,
                health: "ok".to_string(),
                config: Config::from_value(json!({
                    "touchpad": {"min_x": 0, "max_x": 32767, "min_y": 0, "max_y": 32767},
                    "input": {"two_finger_key": 184, "four_finger_key": 183},
                    "device_prefs": {"preferred_keyboard_device": "", "preferred_mouse_device": ""}
                })),
                devices: Some(Vec::new()),
                default_latency: Duration::from_millis(20),
                latencies: HashMap::new(),
                failures: HashMap::new(),
                offline: false,
                log: Vec::new(),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.lock().running = running;
    }

    pub(crate) fn set_status(&self, raw: &str) {
        self.lock().status_override = Some(raw.to_string());
    }

    pub(crate) fn set_health(&self, raw: &str) {
        self.lock().health = raw.to_string();
    }

    pub(crate) fn set_devices(&self, devices: Vec<Device>) {
        self.lock().devices = Some(devices);
    }

    pub(crate) fn set_null_devices(&self) {
        self.lock().devices = None;
    }

    pub(crate) fn set_config(&self, value: Value) {
        self.lock().config = Config::from_value(value);
    }

    pub(crate) fn config(&self) -> Config {
        self.lock().config.clone()
    }

    pub(crate) fn set_default_latency(&self, latency: Duration) {
        self.lock().default_latency = latency;
    }

    pub(crate) fn delay_next(&self, method: Method, path: &str, latency: Duration) {
        self.lock()
            .latencies
            .entry((method, path.to_string()))
            .or_default()
            .push_back(latency);
    }

    pub(crate) fn fail_next(&self, method: Method, path: &str, response: HttpResponse) {
        self.lock()
            .failures
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }

    pub(crate) fn go_offline(&self) {
        self.lock().offline = true;
    }

    pub(crate) fn requests(&self) -> Vec<(Method, String)> {
        self.lock()
            .log
            .iter()
            .map(|request| (request.method, request.path.clone()))
            .collect()
    }

    pub(crate) fn last_body(&self, method: Method, path: &str) -> Option<Value> {
        self.lock()
            .log
            .iter()
            .rev()
            .find(|request| request.method == method && request.path == path)
            .and_then(|request| request.body.as_ref())
            .and_then(|body| serde_json::from_slice(body).ok())
    }

    pub(crate) fn count(&self, method: Method, path: &str) -> usize {
        self.lock()
            .log
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    fn respond(state: &mut FakeState, request: &HttpRequest) -> HttpResponse {
        let route = (request.method, request.path.clone());
        if let Some(failure) = state.failures.get_mut(&route).and_then(VecDeque::pop_front) {
            return failure;
        }

        let body: Value = request
            .body
            .as_ref()
            .and_then(|body| serde_json::from_slice(body).ok())
            .unwrap_or(Value::Null);

        match (request.method, request.path.as_str()) {
            (Method::Post, protocol::SERVICE_START) => {
                if state.running {
                    HttpResponse::json(200, &json!({"status": "already_running"}))
                } else {
                    state.running = true;
                    HttpResponse::json(200, &json!({"status": "started"}))
                }
            }
            (Method::Post, protocol::SERVICE_STOP) => {
                if state.running {
                    state.running = false;
                    HttpResponse::json(200, &json!({"status": "stopped"}))
                } else {
                    HttpResponse::json(200, &json!({"status": "not_running"}))
                }
            }
            (Method::Get, protocol::SERVICE_STATUS) => {
                let status = state.status_override.clone().unwrap_or_else(|| {
                    (if state.running { "running" } else { "stopped" }).to_string()
                });
                HttpResponse::json(200, &json!({ "status": status }))
            }
            (Method::Get, protocol::CONFIG) => HttpResponse::json(200, state.config.as_value()),
            (Method::Put, protocol::CONFIG) => {
                state.config = Config::from_value(body);
                HttpResponse::json(200, state.config.as_value())
            }
            (Method::Post, protocol::CONFIG_SAVE) => {
                let Ok(save) = serde_json::from_value::<SaveConfigRequest>(body) else {
                    return HttpResponse::json(400, &json!({"error": "bad save request"}));
                };
                let path = if save.path.is_empty() {
                    DEFAULT_SAVE_PATH.to_string()
                } else {
                    save.path
                };
                HttpResponse::json(200, &json!({"status": "success", "path": path}))
            }
            (Method::Get, protocol::DEVICES) => {
                HttpResponse::json(200, &serde_json::to_value(&state.devices).unwrap_or(Value::Null))
            }
            (Method::Put, protocol::DEVICES_PREFERRED) => {
                let Ok(prefs) = serde_json::from_value::<PreferredDevicesRequest>(body) else {
                    return HttpResponse::json(400, &json!({"error": "bad preference request"}));
                };
                state.config.set_device_prefs(&shared::domain::DevicePreferences::new(
                    prefs.keyboard_device,
                    prefs.mouse_device,
                ));
                HttpResponse::json(200, &json!({"status": "success"}))
            }
            (Method::Get, protocol::HEALTH) => {
                HttpResponse::json(200, &json!({ "status": state.health }))
            }
            _ => HttpResponse::json(404, &json!({"error": "not found"})),
        }
    }
}

#[async_trait]
impl Transport for FakeService {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let (outcome, latency) = {
            let mut state = self.lock();
            state.log.push(request.clone());
            let route = (request.method, request.path.clone());
            let default_latency = state.default_latency;
            let latency = state
                .latencies
                .get_mut(&route)
                .and_then(VecDeque::pop_front)
                .unwrap_or(default_latency);
            let outcome = if state.offline {
                Err(TransportError::Unreachable("connection refused".to_string()))
            } else {
                Ok(Self::respond(&mut state, &request))
            };
            (outcome, latency)
        };
        tokio::time::sleep(latency).await;
        outcome
    }
}

pub(crate) fn panel_for(service: &Arc<FakeService>) -> (Arc<Panel>, HeadlessSurface) {
    let surface = HeadlessSurface::new();
    let panel = Panel::new(service.clone(), surface.registry(), PanelOptions::default());
    (Arc::new(panel), surface)
}
