use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use tokio::{sync::broadcast, task::JoinHandle, time::sleep};
use tracing::debug;

pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);
pub const ENTRY_DELAY: Duration = Duration::from_millis(10);
pub const EXIT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: Level,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Mounted,
    Visible,
    Exiting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveNotification {
    pub id: u64,
    pub notification: Notification,
    pub phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Shown(LiveNotification),
    PhaseChanged { id: u64, phase: Phase },
    Preempted { id: u64 },
    Dismissed { id: u64 },
}

#[derive(Default)]
struct Slot {
    live: Option<LiveNotification>,
    lifecycle: Option<JoinHandle<()>>,
}

struct Inner {
    slot: Mutex<Slot>,
    next_id: AtomicU64,
    default_duration: Duration,
    events: broadcast::Sender<NotificationEvent>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn advance(&self, id: u64, phase: Phase) {
        let mut slot = self.lock();
        if let Some(live) = slot.live.as_mut().filter(|live| live.id == id) {
            live.phase = phase;
            let _ = self.events.send(NotificationEvent::PhaseChanged { id, phase });
        }
    }

    fn unmount(&self, id: u64) {
        let mut slot = self.lock();
        if slot.live.as_ref().is_some_and(|live| live.id == id) {
            slot.live = None;
            slot.lifecycle = None;
            let _ = self.events.send(NotificationEvent::Dismissed { id });
        }
    }
}

#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Inner>,
}

impl NotificationQueue {
    pub fn new(default_duration: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot::default()),
                next_id: AtomicU64::new(1),
                default_duration,
                events,
            }),
        }
    }

    pub fn notify(&self, message: impl Into<String>, level: Level) -> u64 {
        self.notify_for(message, level, self.inner.default_duration)
    }

    pub fn notify_for(&self, message: impl Into<String>, level: Level, duration: Duration) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let live = LiveNotification {
            id,
            notification: Notification {
                message: message.into(),
                level,
                duration,
            },
            phase: Phase::Mounted,
        };
        debug!(
            id,
            level = level.as_str(),
            message = %live.notification.message,
            "notification mounted"
        );

        let mut slot = self.inner.lock();
        if let Some(lifecycle) = slot.lifecycle.take() {
            lifecycle.abort();
        }
        if let Some(previous) = slot.live.take() {
            let _ = self
                .inner
                .events
                .send(NotificationEvent::Preempted { id: previous.id });
        }
        let _ = self.inner.events.send(NotificationEvent::Shown(live.clone()));
        slot.live = Some(live);

        let inner = Arc::clone(&self.inner);
        slot.lifecycle = Some(tokio::spawn(async move {
            sleep(ENTRY_DELAY).await;
            inner.advance(id, Phase::Visible);
            sleep(duration).await;
            inner.advance(id, Phase::Exiting);
            sleep(EXIT_DELAY).await;
            inner.unmount(id);
        }));

        id
    }

    pub fn current(&self) -> Option<LiveNotification> {
        self.inner.lock().live.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

#[cfg(test)]
#[path = "tests/notifications_tests.rs"]
mod tests;
