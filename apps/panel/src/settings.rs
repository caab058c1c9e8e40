use std::{fs, io, path::Path, time::Duration};

use anyhow::{bail, Context};
use client_core::PanelOptions;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "panel.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub poll_interval_ms: u64,
    pub min_busy_ms: u64,
    pub notification_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".into(),
            poll_interval_ms: 10_000,
            min_busy_ms: 300,
            notification_ms: 3_000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    poll_interval_ms: Option<u64>,
    min_busy_ms: Option<u64>,
    notification_ms: Option<u64>,
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn panel_options(&self) -> PanelOptions {
        PanelOptions {
            min_busy: Duration::from_millis(self.min_busy_ms),
            notification_duration: Duration::from_millis(self.notification_ms),
        }
    }

    pub fn with_server_url(mut self, server_url: Option<String>) -> anyhow::Result<Self> {
        if let Some(server_url) = server_url {
            self.server_url = server_url;
        }
        validate_server_url(&self.server_url)?;
        Ok(self)
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.server_url {
            self.server_url = v;
        }
        if let Some(v) = file.poll_interval_ms {
            self.poll_interval_ms = v;
        }
        if let Some(v) = file.min_busy_ms {
            self.min_busy_ms = v;
        }
        if let Some(v) = file.notification_ms {
            self.notification_ms = v;
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("PANEL_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = env("APP__SERVER_URL") {
            self.server_url = v;
        }

        let millis = |key: &str| env(key).and_then(|v| v.trim().parse::<u64>().ok());
        if let Some(v) = millis("APP__POLL_INTERVAL_MS") {
            self.poll_interval_ms = v;
        }
        if let Some(v) = millis("APP__MIN_BUSY_MS") {
            self.min_busy_ms = v;
        }
        if let Some(v) = millis("APP__NOTIFICATION_MS") {
            self.notification_ms = v;
        }
    }
}

/// Defaults, then the settings file, then the environment. An explicit
/// `path` must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let file_path = path.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_FILE));
    let raw = match fs::read_to_string(file_path) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == io::ErrorKind::NotFound && path.is_none() => None,
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", file_path.display()))
        }
    };

    resolve(raw.as_deref(), |key| std::env::var(key).ok())
        .with_context(|| format!("invalid settings in '{}'", file_path.display()))
}

fn resolve(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    if let Some(raw) = file {
        settings.apply_file(toml::from_str(raw)?);
    }
    settings.apply_env(env);
    validate_server_url(&settings.server_url)?;
    validate_timing(&settings)?;
    Ok(settings)
}

fn validate_timing(settings: &Settings) -> anyhow::Result<()> {
    if settings.poll_interval_ms == 0 {
        bail!("poll interval must be greater than zero");
    }
    if settings.poll_interval_ms < settings.min_busy_ms {
        bail!(
            "poll interval ({} ms) is shorter than the minimum busy window ({} ms)",
            settings.poll_interval_ms,
            settings.min_busy_ms
        );
    }
    Ok(())
}

fn validate_server_url(raw: &str) -> anyhow::Result<()> {
    let url = Url::parse(raw).with_context(|| format!("invalid server url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("server url '{raw}' must use http or https");
    }
    Ok(())
}
