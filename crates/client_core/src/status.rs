use chrono::{DateTime, Local};
use shared::domain::{HealthStatus, ServiceStatus};

use crate::bindings::ControlId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Nominal,
    Degraded,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Indicator,
    /// Enablement to apply; empty means keep the last known state.
    pub affected_controls: Vec<(ControlId, bool)>,
}

pub fn classify_service(raw: &str) -> Classification {
    match ServiceStatus::parse(raw) {
        ServiceStatus::Running => Classification {
            category: Indicator::Nominal,
            affected_controls: vec![
                (ControlId::StartService, false),
                (ControlId::StopService, true),
            ],
        },
        ServiceStatus::Stopped | ServiceStatus::Error => Classification {
            category: Indicator::Degraded,
            affected_controls: vec![
                (ControlId::StartService, true),
                (ControlId::StopService, false),
            ],
        },
        ServiceStatus::Unknown => Classification {
            category: Indicator::Unknown,
            affected_controls: Vec::new(),
        },
    }
}

pub fn classify_health(raw: &str) -> Indicator {
    match HealthStatus::parse(raw) {
        HealthStatus::Ok => Indicator::Nominal,
        HealthStatus::Error => Indicator::Degraded,
        HealthStatus::Unknown => Indicator::Unknown,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub text: String,
    pub indicator: Indicator,
}

impl StatusView {
    pub const FETCH_FAILED_TEXT: &'static str = "Error";

    pub fn from_raw(raw: &str) -> Self {
        Self {
            text: raw.to_string(),
            indicator: classify_service(raw).category,
        }
    }

    pub fn fetch_failed() -> Self {
        Self {
            text: Self::FETCH_FAILED_TEXT.to_string(),
            indicator: Indicator::Degraded,
        }
    }
}

impl Default for StatusView {
    fn default() -> Self {
        Self {
            text: "unknown".to_string(),
            indicator: Indicator::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthView {
    pub text: String,
    pub indicator: Indicator,
    pub last_checked: Option<DateTime<Local>>,
    pub last_check_failed: bool,
}

impl HealthView {
    pub fn checked(raw: &str, at: DateTime<Local>) -> Self {
        Self {
            text: raw.to_string(),
            indicator: classify_health(raw),
            last_checked: Some(at),
            last_check_failed: false,
        }
    }

    pub fn check_failed(at: DateTime<Local>) -> Self {
        Self {
            text: "error".to_string(),
            indicator: Indicator::Degraded,
            last_checked: Some(at),
            last_check_failed: true,
        }
    }

    pub fn last_checked_label(&self) -> String {
        match self.last_checked {
            None => "never".to_string(),
            Some(at) if self.last_check_failed => {
                format!("{} (error)", at.format("%Y-%m-%d %H:%M:%S"))
            }
            Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl Default for HealthView {
    fn default() -> Self {
        Self {
            text: "unknown".to_string(),
            indicator: Indicator::Unknown,
            last_checked: None,
            last_check_failed: false,
        }
    }
}
