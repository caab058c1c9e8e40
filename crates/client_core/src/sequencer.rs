use std::{future::Future, sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{error::PanelError, panel::Panel};

pub const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(10_000);

pub const INIT_PACING: [Duration; 3] = [
    Duration::from_millis(300),
    Duration::from_millis(200),
    Duration::from_millis(200),
];

pub struct Sequencer {
    panel: Arc<Panel>,
    pacing: [Duration; 3],
    poll_interval: Duration,
}

impl Sequencer {
    pub fn new(panel: Arc<Panel>) -> Self {
        Self::with_timing(panel, INIT_PACING, STATUS_POLL_INTERVAL)
    }

    pub fn with_timing(panel: Arc<Panel>, pacing: [Duration; 3], poll_interval: Duration) -> Self {
        Self {
            panel,
            pacing,
            poll_interval,
        }
    }

    pub fn panel(&self) -> &Arc<Panel> {
        &self.panel
    }

    /// Status, config, devices, health, strictly in order. A failing step
    /// has already been reported by the dispatcher and does not stop the
    /// ones after it.
    pub async fn run(&self) {
        info!("initial load started");
        step("status", self.panel.refresh_status()).await;
        sleep(self.pacing[0]).await;
        step("config", self.panel.fetch_config()).await;
        sleep(self.pacing[1]).await;
        step("devices", self.panel.fetch_devices()).await;
        sleep(self.pacing[2]).await;
        step("health", self.panel.check_health()).await;
        info!("initial load finished");
    }

    /// Re-runs the status step every poll interval, first tick one interval
    /// from now, for as long as the returned task is alive. Each tick fires
    /// regardless of earlier requests still in flight; manual refreshes do
    /// not reset it.
    pub fn spawn_status_poll(&self) -> JoinHandle<()> {
        let panel = Arc::clone(&self.panel);
        let period = self.poll_interval;
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("status poll tick");
                let panel = Arc::clone(&panel);
                tokio::spawn(async move {
                    if let Err(err) = panel.refresh_status().await {
                        debug!(error = %err, "status poll failed");
                    }
                });
            }
        })
    }

    pub async fn start(&self) -> JoinHandle<()> {
        self.run().await;
        self.spawn_status_poll()
    }
}

async fn step(name: &'static str, fut: impl Future<Output = Result<(), PanelError>>) {
    if let Err(err) = fut.await {
        warn!(step = name, error = %err, "initial load step failed");
    }
}

#[cfg(test)]
#[path = "tests/sequencer_tests.rs"]
mod tests;
