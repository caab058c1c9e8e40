use std::fmt;

use shared::protocol::{self, Method};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlId {
    StartService,
    StopService,
    RefreshStatus,
    FetchConfig,
    UpdateConfig,
    SaveConfig,
    FetchDevices,
    SetPreferredDevices,
    CheckHealth,
}

impl ControlId {
    pub const ALL: [ControlId; 9] = [
        ControlId::StartService,
        ControlId::StopService,
        ControlId::RefreshStatus,
        ControlId::FetchConfig,
        ControlId::UpdateConfig,
        ControlId::SaveConfig,
        ControlId::FetchDevices,
        ControlId::SetPreferredDevices,
        ControlId::CheckHealth,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartService => "start_service",
            Self::StopService => "stop_service",
            Self::RefreshStatus => "refresh_status",
            Self::FetchConfig => "fetch_config",
            Self::UpdateConfig => "update_config",
            Self::SaveConfig => "save_config",
            Self::FetchDevices => "fetch_devices",
            Self::SetPreferredDevices => "set_preferred_devices",
            Self::CheckHealth => "check_health",
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    Spinner,
    Play,
    Stop,
    Sync,
    Download,
    Upload,
    Save,
    Stethoscope,
}

impl Glyph {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spinner => "spinner",
            Self::Play => "play",
            Self::Stop => "stop",
            Self::Sync => "sync",
            Self::Download => "download",
            Self::Upload => "upload",
            Self::Save => "save",
            Self::Stethoscope => "stethoscope",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBinding {
    pub endpoint: &'static str,
    pub method: Method,
    pub control: ControlId,
    pub busy_glyph: Glyph,
    pub idle_glyph: Glyph,
}

const fn bind(endpoint: &'static str, method: Method, control: ControlId, idle_glyph: Glyph) -> ControlBinding {
    ControlBinding {
        endpoint,
        method,
        control,
        busy_glyph: Glyph::Spinner,
        idle_glyph,
    }
}

pub const BINDINGS: [ControlBinding; 9] = [
    bind(protocol::SERVICE_START, Method::Post, ControlId::StartService, Glyph::Play),
    bind(protocol::SERVICE_STOP, Method::Post, ControlId::StopService, Glyph::Stop),
    bind(protocol::SERVICE_STATUS, Method::Get, ControlId::RefreshStatus, Glyph::Sync),
    bind(protocol::CONFIG, Method::Get, ControlId::FetchConfig, Glyph::Download),
    bind(protocol::CONFIG, Method::Put, ControlId::UpdateConfig, Glyph::Upload),
    bind(protocol::CONFIG_SAVE, Method::Post, ControlId::SaveConfig, Glyph::Save),
    bind(protocol::DEVICES, Method::Get, ControlId::FetchDevices, Glyph::Sync),
    bind(protocol::DEVICES_PREFERRED, Method::Put, ControlId::SetPreferredDevices, Glyph::Save),
    bind(protocol::HEALTH, Method::Get, ControlId::CheckHealth, Glyph::Stethoscope),
];

/// Exact match on both endpoint and method; anything else is unbound.
pub fn binding_for(endpoint: &str, method: Method) -> Option<&'static ControlBinding> {
    BINDINGS
        .iter()
        .find(|binding| binding.endpoint == endpoint && binding.method == method)
}
