use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::Local;
use shared::{
    domain::Device,
    protocol::{
        self, Config, Method, PreferredDevicesRequest, SaveConfigRequest, SaveConfigResponse,
        ServiceActionResponse, StatusResponse, START_ALREADY_RUNNING, STOP_NOT_RUNNING,
    },
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    controls::ControlRegistry,
    dispatcher::{Dispatcher, MIN_BUSY, NO_BODY},
    error::{PanelError, ValidationError},
    notifications::{Level, NotificationQueue, DEFAULT_DURATION},
    state::PanelState,
    status::Indicator,
    transport::Transport,
};

#[derive(Debug, Clone)]
pub struct PanelOptions {
    pub min_busy: Duration,
    pub notification_duration: Duration,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            min_busy: MIN_BUSY,
            notification_duration: DEFAULT_DURATION,
        }
    }
}

pub struct Panel {
    dispatcher: Dispatcher,
    state: Arc<RwLock<PanelState>>,
    status_seq: AtomicU64,
}

impl Panel {
    pub fn new(transport: Arc<dyn Transport>, controls: ControlRegistry, options: PanelOptions) -> Self {
        Self::with_state(
            transport,
            controls,
            options,
            Arc::new(RwLock::new(PanelState::default())),
        )
    }

    pub fn with_state(
        transport: Arc<dyn Transport>,
        controls: ControlRegistry,
        options: PanelOptions,
        state: Arc<RwLock<PanelState>>,
    ) -> Self {
        let notifications = NotificationQueue::new(options.notification_duration);
        Self {
            dispatcher: Dispatcher::with_min_busy(transport, controls, notifications, options.min_busy),
            state,
            status_seq: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> Arc<RwLock<PanelState>> {
        Arc::clone(&self.state)
    }

    pub async fn snapshot(&self) -> PanelState {
        self.state.read().await.clone()
    }

    pub fn notifications(&self) -> &NotificationQueue {
        self.dispatcher.notifications()
    }

    pub async fn settled(&self) {
        self.dispatcher.settled().await;
    }

    fn notify(&self, message: impl Into<String>, level: Level) {
        self.dispatcher.notifications().notify(message, level);
    }

    fn reject(&self, err: ValidationError) -> PanelError {
        warn!(error = %err, "rejected before dispatch");
        self.notify(err.to_string(), Level::Error);
        err.into()
    }

    pub async fn start_service(&self) -> Result<(), PanelError> {
        let reply: ServiceActionResponse = self
            .dispatcher
            .dispatch_as(protocol::SERVICE_START, Method::Post, NO_BODY)
            .await?;
        if reply.status == START_ALREADY_RUNNING {
            self.notify("Service is already running", Level::Info);
        } else {
            info!("service started");
            self.notify("Service started", Level::Success);
        }
        self.refresh_status_quietly().await;
        Ok(())
    }

    pub async fn stop_service(&self) -> Result<(), PanelError> {
        let reply: ServiceActionResponse = self
            .dispatcher
            .dispatch_as(protocol::SERVICE_STOP, Method::Post, NO_BODY)
            .await?;
        if reply.status == STOP_NOT_RUNNING {
            self.notify("Service is already stopped", Level::Info);
        } else {
            info!("service stopped");
            self.notify("Service stopped", Level::Success);
        }
        self.refresh_status_quietly().await;
        Ok(())
    }

    /// Each call is numbered; a reply overtaken by a newer one is dropped.
    pub async fn refresh_status(&self) -> Result<(), PanelError> {
        let seq = self.status_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome: Result<StatusResponse, _> = self
            .dispatcher
            .dispatch_as(protocol::SERVICE_STATUS, Method::Get, NO_BODY)
            .await;

        let mut state = self.state.write().await;
        let applied = match &outcome {
            Ok(reply) => state.apply_service_status(seq, &reply.status, self.dispatcher.controls()),
            Err(_) => state.apply_status_failure(seq),
        };
        if !applied {
            debug!(seq, latest = state.status_seq, "discarded stale status reply");
        }
        outcome.map(|_| ()).map_err(PanelError::from)
    }

    async fn refresh_status_quietly(&self) {
        if let Err(err) = self.refresh_status().await {
            debug!(error = %err, "status refresh after service action failed");
        }
    }

    pub async fn fetch_config(&self) -> Result<(), PanelError> {
        match self
            .dispatcher
            .dispatch_as::<Config, _>(protocol::CONFIG, Method::Get, NO_BODY)
            .await
        {
            Ok(config) => {
                self.state.write().await.apply_config(config);
                self.notify("Configuration loaded", Level::Info);
                Ok(())
            }
            Err(err) => {
                self.state.write().await.apply_config_failure(&err.message);
                Err(err.into())
            }
        }
    }

    /// Text that is not JSON is rejected without a request.
    pub async fn update_config(&self, text: &str) -> Result<(), PanelError> {
        let config = Config::parse(text).map_err(|err| self.reject(err.into()))?;
        self.dispatcher
            .dispatch(protocol::CONFIG, Method::Put, Some(config.as_value()))
            .await?;
        self.state.write().await.config_text = text.to_string();
        self.notify("Configuration updated", Level::Success);
        Ok(())
    }

    /// An empty `path` leaves the location to the service.
    pub async fn save_config(&self, path: &str) -> Result<String, PanelError> {
        let request = SaveConfigRequest {
            path: path.to_string(),
        };
        let reply: SaveConfigResponse = self
            .dispatcher
            .dispatch_as(protocol::CONFIG_SAVE, Method::Post, Some(&request))
            .await?;
        let location = if reply.path.is_empty() {
            "default location"
        } else {
            reply.path.as_str()
        };
        self.notify(format!("Configuration saved: {location}"), Level::Success);
        Ok(reply.path)
    }

    pub async fn fetch_devices(&self) -> Result<(), PanelError> {
        let fetched = async {
            let devices: Option<Vec<Device>> = self
                .dispatcher
                .dispatch_as(protocol::DEVICES, Method::Get, NO_BODY)
                .await?;
            let config: Config = self
                .dispatcher
                .dispatch_as(protocol::CONFIG, Method::Get, NO_BODY)
                .await?;
            Ok::<_, PanelError>((devices.unwrap_or_default(), config))
        }
        .await;

        let (devices, config) = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                self.state.write().await.apply_devices_failure();
                return Err(err);
            }
        };

        self.state.write().await.apply_devices(&devices, &config);
        debug!(count = devices.len(), "device inventory reconciled");
        if !devices.is_empty() {
            self.notify(format!("Found {} devices", devices.len()), Level::Info);
        }
        Ok(())
    }

    pub async fn select_keyboard(&self, name: &str) -> bool {
        self.state.write().await.devices.keyboard.select(name)
    }

    pub async fn select_mouse(&self, name: &str) -> bool {
        self.state.write().await.devices.mouse.select(name)
    }

    /// Overwrites both preference slots; an empty name clears its slot.
    /// Rejected without a request when both are empty.
    pub async fn set_preferred(&self, keyboard: &str, mouse: &str) -> Result<(), PanelError> {
        if keyboard.is_empty() && mouse.is_empty() {
            return Err(self.reject(ValidationError::NoDeviceSelected));
        }

        let request = PreferredDevicesRequest {
            keyboard_device: keyboard.to_string(),
            mouse_device: mouse.to_string(),
        };
        self.dispatcher
            .dispatch(protocol::DEVICES_PREFERRED, Method::Put, Some(&request))
            .await?;
        info!(keyboard, mouse, "preferred devices updated");
        self.notify("Preferred devices updated", Level::Success);

        let (config, devices) = tokio::join!(self.fetch_config(), self.fetch_devices());
        config.and(devices).inspect_err(|err| {
            debug!(error = %err, "re-fetch after preference update failed");
        })
    }

    pub async fn apply_selected_preferences(&self) -> Result<(), PanelError> {
        let (keyboard, mouse) = {
            let state = self.state.read().await;
            let (keyboard, mouse) = state.devices.selection();
            (keyboard.to_string(), mouse.to_string())
        };
        self.set_preferred(&keyboard, &mouse).await
    }

    pub async fn check_health(&self) -> Result<(), PanelError> {
        match self
            .dispatcher
            .dispatch_as::<StatusResponse, _>(protocol::HEALTH, Method::Get, NO_BODY)
            .await
        {
            Ok(reply) => {
                let indicator = {
                    let mut state = self.state.write().await;
                    state.apply_health(&reply.status, Local::now());
                    state.health.indicator
                };
                if indicator == Indicator::Nominal {
                    self.notify("Service is healthy", Level::Success);
                } else {
                    self.notify(format!("Health: {}", reply.status), Level::Info);
                }
                Ok(())
            }
            Err(err) => {
                self.state.write().await.apply_health_failure(Local::now());
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/panel_tests.rs"]
mod tests;
