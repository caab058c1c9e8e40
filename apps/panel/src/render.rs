use client_core::{
    devices::{DeviceList, Selector},
    status::Indicator,
    HeadlessSurface, NotificationEvent, PanelState,
};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

fn marker(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::Nominal => "[ok]",
        Indicator::Degraded => "[!!]",
        Indicator::Unknown => "[??]",
    }
}

pub fn status_line(state: &PanelState) -> String {
    format!("service {} {}", marker(state.status.indicator), state.status.text)
}

pub fn health_line(state: &PanelState) -> String {
    format!(
        "health  {} {} (last checked: {})",
        marker(state.health.indicator),
        state.health.text,
        state.health.last_checked_label()
    )
}

fn selector_lines(name: &str, selector: &Selector) -> Vec<String> {
    let mut lines = vec![format!("{name}:")];
    let placeholder_selected = selector.selected_value().is_empty();
    lines.push(format!(
        "  {} {}",
        if placeholder_selected { "*" } else { " " },
        selector.placeholder
    ));
    for option in &selector.options {
        lines.push(format!(
            "  {} {}",
            if option.selected { "*" } else { " " },
            option.label
        ));
    }
    lines
}

pub fn device_lines(state: &PanelState) -> Vec<String> {
    let mut lines = match &state.devices.list {
        DeviceList::NotLoaded => vec!["devices not loaded".to_string()],
        DeviceList::Empty => vec!["No devices found".to_string()],
        DeviceList::LoadFailed => vec!["Failed to load devices".to_string()],
        DeviceList::Devices(devices) => devices
            .iter()
            .map(|entry| {
                format!(
                    "{:<24} {:<20} {:<8}{}",
                    entry.device.name,
                    entry.device.path,
                    entry.device.kind.label(),
                    if entry.preferred { " (preferred)" } else { "" }
                )
            })
            .collect(),
    };
    lines.extend(selector_lines("keyboard", &state.devices.keyboard));
    lines.extend(selector_lines("mouse", &state.devices.mouse));
    lines
}

pub fn control_lines(surface: &HeadlessSurface) -> Vec<String> {
    surface
        .snapshots()
        .into_iter()
        .map(|(id, snapshot)| {
            let availability = if snapshot.busy {
                "busy"
            } else if snapshot.enabled {
                "ready"
            } else {
                "disabled"
            };
            format!("{:<22} {:<10} {}", id.as_str(), snapshot.glyph.as_str(), availability)
        })
        .collect()
}

pub fn print_lines(lines: impl IntoIterator<Item = String>) {
    for line in lines {
        println!("{line}");
    }
}

fn print_event(event: &NotificationEvent) {
    if let NotificationEvent::Shown(live) = event {
        println!(
            "{:>7}: {}",
            live.notification.level.as_str(),
            live.notification.message
        );
    }
}

/// Prints whatever notifications were shown since the last call.
pub fn drain_notifications(rx: &mut broadcast::Receiver<NotificationEvent>) {
    loop {
        match rx.try_recv() {
            Ok(event) => print_event(&event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

pub async fn follow_notifications(mut rx: broadcast::Receiver<NotificationEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => print_event(&event),
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}
