use chrono::{DateTime, Local};
use shared::{
    domain::{Device, ServiceStatus},
    protocol::Config,
};

use crate::{
    controls::ControlRegistry,
    devices::{reconcile, DeviceView},
    status::{classify_service, HealthView, StatusView},
};

#[derive(Debug, Clone, Default)]
pub struct PanelState {
    pub status: StatusView,
    /// Last reported running flag; `None` until a recognized status arrives.
    pub service_running: Option<bool>,
    pub status_seq: u64,
    pub health: HealthView,
    pub config_text: String,
    pub config: Option<Config>,
    pub devices: DeviceView,
}

impl PanelState {
    pub fn apply_service_status(&mut self, seq: u64, raw: &str, controls: &ControlRegistry) -> bool {
        if seq <= self.status_seq {
            return false;
        }
        self.status_seq = seq;

        let classification = classify_service(raw);
        self.status = StatusView::from_raw(raw);
        match ServiceStatus::parse(raw) {
            ServiceStatus::Running => self.service_running = Some(true),
            ServiceStatus::Stopped | ServiceStatus::Error => self.service_running = Some(false),
            ServiceStatus::Unknown => {}
        }
        for (id, enabled) in classification.affected_controls {
            controls.set_enabled(id, enabled);
        }
        true
    }

    /// The fetch itself failed: show the error, leave enablement alone.
    pub fn apply_status_failure(&mut self, seq: u64) -> bool {
        if seq <= self.status_seq {
            return false;
        }
        self.status_seq = seq;
        self.status = StatusView::fetch_failed();
        true
    }

    pub fn apply_health(&mut self, raw: &str, at: DateTime<Local>) {
        self.health = HealthView::checked(raw, at);
    }

    pub fn apply_health_failure(&mut self, at: DateTime<Local>) {
        self.health = HealthView::check_failed(at);
    }

    pub fn apply_config(&mut self, config: Config) {
        self.config_text = config.to_pretty_string();
        self.config = Some(config);
    }

    pub fn apply_config_failure(&mut self, message: &str) {
        self.config_text = format!("Error: {message}");
    }

    pub fn apply_devices(&mut self, devices: &[Device], config: &Config) {
        self.devices = reconcile(devices, &config.device_prefs());
    }

    pub fn apply_devices_failure(&mut self) {
        self.devices = DeviceView::load_failed();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use shared::domain::DeviceKind;

    use super::*;
    use crate::{bindings::ControlId, controls::HeadlessSurface, devices::DeviceList, status::Indicator};

    #[test]
    fn stale_status_is_discarded() {
        let surface = HeadlessSurface::new();
        let controls = surface.registry();
        let mut state = PanelState::default();

        assert!(state.apply_service_status(2, "running", &controls));
        assert!(!state.apply_service_status(1, "stopped", &controls));
        assert!(!state.apply_status_failure(2));

        assert_eq!(state.status.indicator, Indicator::Nominal);
        assert_eq!(state.service_running, Some(true));
        let start = surface.snapshot(ControlId::StartService).expect("bound");
        assert!(!start.enabled);
    }

    #[test]
    fn status_failure_keeps_button_enablement() {
        let surface = HeadlessSurface::new();
        let controls = surface.registry();
        let mut state = PanelState::default();
        state.apply_service_status(1, "stopped", &controls);

        assert!(state.apply_status_failure(2));

        assert_eq!(state.status.text, "Error");
        assert_eq!(state.status.indicator, Indicator::Degraded);
        assert_eq!(state.service_running, Some(false));
        assert!(surface.snapshot(ControlId::StartService).expect("bound").enabled);
        assert!(!surface.snapshot(ControlId::StopService).expect("bound").enabled);
    }

    #[test]
    fn devices_are_reconciled_against_config_prefs() {
        let mut state = PanelState::default();
        let config = Config::from_value(json!({
            "device_prefs": {"preferred_keyboard_device": "kbd", "preferred_mouse_device": ""}
        }));
        state.apply_devices(&[Device::new("kbd", "/dev/input/event3", DeviceKind::Keyboard)], &config);

        let DeviceList::Devices(list) = &state.devices.list else {
            panic!("expected devices");
        };
        assert!(list[0].preferred);
        assert_eq!(state.devices.selection(), ("kbd", ""));
    }
}
