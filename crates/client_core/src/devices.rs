use shared::domain::{Device, DeviceKind, DevicePreferences};

pub const KEYBOARD_PLACEHOLDER: &str = "-- Select keyboard --";
pub const MOUSE_PLACEHOLDER: &str = "-- Select mouse --";
pub const LOAD_ERROR_PLACEHOLDER: &str = "Load error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedDevice {
    pub device: Device,
    pub preferred: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeviceList {
    #[default]
    NotLoaded,
    Empty,
    Devices(Vec<AnnotatedDevice>),
    LoadFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// A drop-down whose implicit first entry is `placeholder` (value "").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub placeholder: String,
    pub options: Vec<SelectOption>,
}

impl Selector {
    pub fn placeholder_only(placeholder: &str) -> Self {
        Self {
            placeholder: placeholder.to_string(),
            options: Vec::new(),
        }
    }

    pub fn selected_value(&self) -> &str {
        self.options
            .iter()
            .find(|option| option.selected)
            .map(|option| option.value.as_str())
            .unwrap_or_default()
    }

    /// Selects the option with `value`; "" selects the placeholder.
    /// Returns false and leaves the selection untouched for unknown values.
    pub fn select(&mut self, value: &str) -> bool {
        if !value.is_empty() && !self.options.iter().any(|option| option.value == value) {
            return false;
        }
        for option in &mut self.options {
            option.selected = option.value == value;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceView {
    pub list: DeviceList,
    pub keyboard: Selector,
    pub mouse: Selector,
}

impl DeviceView {
    pub fn load_failed() -> Self {
        Self {
            list: DeviceList::LoadFailed,
            keyboard: Selector::placeholder_only(LOAD_ERROR_PLACEHOLDER),
            mouse: Selector::placeholder_only(LOAD_ERROR_PLACEHOLDER),
        }
    }

    pub fn selection(&self) -> (&str, &str) {
        (self.keyboard.selected_value(), self.mouse.selected_value())
    }
}

impl Default for DeviceView {
    fn default() -> Self {
        Self {
            list: DeviceList::NotLoaded,
            keyboard: Selector::placeholder_only(KEYBOARD_PLACEHOLDER),
            mouse: Selector::placeholder_only(MOUSE_PLACEHOLDER),
        }
    }
}

fn is_preferred(device: &Device, prefs: &DevicePreferences) -> bool {
    prefs.preferred_for(device.kind) == Some(device.name.as_str())
}

pub fn reconcile(devices: &[Device], prefs: &DevicePreferences) -> DeviceView {
    let mut view = DeviceView {
        list: DeviceList::Empty,
        ..DeviceView::default()
    };
    if devices.is_empty() {
        return view;
    }

    let mut list = Vec::with_capacity(devices.len());
    for device in devices {
        let preferred = is_preferred(device, prefs);
        let selector = match device.kind {
            DeviceKind::Keyboard => Some(&mut view.keyboard),
            DeviceKind::Mouse => Some(&mut view.mouse),
            DeviceKind::Other(_) => None,
        };
        if let Some(selector) = selector {
            selector.options.push(SelectOption {
                value: device.name.clone(),
                label: format!("{} ({})", device.name, device.path),
                selected: preferred,
            });
        }
        list.push(AnnotatedDevice {
            device: device.clone(),
            preferred,
        });
    }
    view.list = DeviceList::Devices(list);
    view
}

#[cfg(test)]
#[path = "tests/devices_tests.rs"]
mod tests;
