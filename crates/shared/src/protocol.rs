use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{domain::DevicePreferences, error::ConfigParseError};

pub const API_BASE_PATH: &str = "/api";

pub const SERVICE_START: &str = "/service/start";
pub const SERVICE_STOP: &str = "/service/stop";
pub const SERVICE_STATUS: &str = "/service/status";
pub const CONFIG: &str = "/config";
pub const CONFIG_SAVE: &str = "/config/save";
pub const DEVICES: &str = "/devices";
pub const DEVICES_PREFERRED: &str = "/devices/preferred";
pub const HEALTH: &str = "/health";

pub const START_ALREADY_RUNNING: &str = "already_running";
pub const STOP_NOT_RUNNING: &str = "not_running";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceActionResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveConfigRequest {
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveConfigResponse {
    #[serde(default)]
    pub path: String,
}

/// Body of `PUT /devices/preferred`. Both fields are always sent; an empty
/// string clears that preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredDevicesRequest {
    pub keyboard_device: String,
    pub mouse_device: String,
}

/// The service configuration. Only `device_prefs` is interpreted; every
/// other field is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config(Value);

impl Config {
    pub const DEVICE_PREFS_KEY: &'static str = "device_prefs";

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigParseError> {
        Ok(Self(serde_json::from_str(text)?))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }

    /// Missing or malformed `device_prefs` reads as "no preferences".
    pub fn device_prefs(&self) -> DevicePreferences {
        self.0
            .get(Self::DEVICE_PREFS_KEY)
            .cloned()
            .and_then(|prefs| serde_json::from_value(prefs).ok())
            .unwrap_or_default()
    }

    /// Overwrites both preference fields, keeping any sibling keys of
    /// `device_prefs` and every other top-level field.
    pub fn set_device_prefs(&mut self, prefs: &DevicePreferences) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        let Some(root) = self.0.as_object_mut() else {
            return;
        };
        let section = root
            .entry(Self::DEVICE_PREFS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !section.is_object() {
            *section = Value::Object(Map::new());
        }
        if let Some(section) = section.as_object_mut() {
            section.insert(
                "preferred_keyboard_device".into(),
                Value::String(prefs.preferred_keyboard_device.clone()),
            );
            section.insert(
                "preferred_mouse_device".into(),
                Value::String(prefs.preferred_mouse_device.clone()),
            );
        }
    }
}
