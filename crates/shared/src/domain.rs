use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum DeviceKind {
    Keyboard,
    Mouse,
    Other(i64),
}

impl From<i64> for DeviceKind {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Keyboard,
            1 => Self::Mouse,
            other => Self::Other(other),
        }
    }
}

impl From<DeviceKind> for i64 {
    fn from(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Keyboard => 0,
            DeviceKind::Mouse => 1,
            DeviceKind::Other(code) => code,
        }
    }
}

impl DeviceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Keyboard => "keyboard",
            Self::Mouse => "mouse",
            Self::Other(_) => "other",
        }
    }
}

/// Names are unique within one inventory but not across inventories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "Type")]
    pub kind: DeviceKind,
}

impl Device {
    pub fn new(name: impl Into<String>, path: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
        }
    }
}

/// The `device_prefs` section of the service configuration. An empty
/// string means no preference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePreferences {
    #[serde(default)]
    pub preferred_keyboard_device: String,
    #[serde(default)]
    pub preferred_mouse_device: String,
}

impl DevicePreferences {
    pub fn new(keyboard: impl Into<String>, mouse: impl Into<String>) -> Self {
        Self {
            preferred_keyboard_device: keyboard.into(),
            preferred_mouse_device: mouse.into(),
        }
    }

    /// The stored preference for a device kind; `None` for kinds that have
    /// no preference slot or when the slot is empty.
    pub fn preferred_for(&self, kind: DeviceKind) -> Option<&str> {
        let slot = match kind {
            DeviceKind::Keyboard => &self.preferred_keyboard_device,
            DeviceKind::Mouse => &self.preferred_mouse_device,
            DeviceKind::Other(_) => return None,
        };
        (!slot.is_empty()).then_some(slot.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Running,
    Stopped,
    Error,
    Unknown,
}

impl ServiceStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Ok,
    Error,
    Unknown,
}

impl HealthStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ok" => Self::Ok,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }
}
