use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use shared::{error::ErrorEnvelope, protocol::Method};
use tokio::{
    task::JoinHandle,
    time::{sleep, Instant},
};
use tracing::{debug, warn};

use crate::{
    bindings::{binding_for, Glyph},
    controls::{Control, ControlRegistry},
    error::ApiError,
    notifications::{Level, NotificationQueue},
    transport::{HttpRequest, HttpResponse, Transport},
};

pub const MIN_BUSY: Duration = Duration::from_millis(300);

pub const NO_BODY: Option<&'static ()> = None;

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Json(Value),
    EmptyAck,
}

impl Reply {
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::EmptyAck => json!({ "status": "success" }),
        }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    controls: ControlRegistry,
    notifications: NotificationQueue,
    min_busy: Duration,
    restores: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        controls: ControlRegistry,
        notifications: NotificationQueue,
    ) -> Self {
        Self::with_min_busy(transport, controls, notifications, MIN_BUSY)
    }

    pub fn with_min_busy(
        transport: Arc<dyn Transport>,
        controls: ControlRegistry,
        notifications: NotificationQueue,
        min_busy: Duration,
    ) -> Self {
        Self {
            transport,
            controls,
            notifications,
            min_busy,
            restores: Arc::default(),
        }
    }

    pub fn controls(&self) -> &ControlRegistry {
        &self.controls
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub async fn dispatch<B>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<Reply, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let started = Instant::now();
        let bound = binding_for(endpoint, method).and_then(|binding| {
            self.controls
                .get(binding.control)
                .map(|control| (binding, Arc::clone(control)))
        });
        if let Some((binding, control)) = &bound {
            control.set_busy(binding.busy_glyph);
        }

        let outcome = self.exchange(endpoint, method, body).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(_) => debug!(%method, endpoint, elapsed_ms, "dispatch succeeded"),
            Err(err) => {
                warn!(%method, endpoint, elapsed_ms, error = %err, "dispatch failed");
                self.report(err);
            }
        }

        if let Some((binding, control)) = bound {
            self.restore(started, binding.idle_glyph, control);
        }
        outcome
    }

    /// [`Self::dispatch`] followed by decoding the reply. A reply that does
    /// not have the expected shape is a failure like any other.
    pub async fn dispatch_as<T, B>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let reply = self.dispatch(endpoint, method, body).await?;
        serde_json::from_value(reply.into_value()).map_err(|err| {
            let err = ApiError::new(format!("Unexpected response from {endpoint}: {err}"));
            warn!(%method, endpoint, error = %err, "reply decoding failed");
            self.report(&err);
            err
        })
    }

    fn report(&self, err: &ApiError) {
        self.notifications.notify(err.message.clone(), Level::Error);
    }

    async fn exchange<B>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<Reply, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = HttpRequest::new(method, endpoint);
        if let Some(body) = body {
            request = request.with_json(body)?;
        }
        let response = self.transport.send(request).await?;
        normalize(response)
    }

    fn restore(&self, started: Instant, glyph: Glyph, control: Arc<dyn Control>) {
        let remaining = self.min_busy.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            control.set_idle(glyph);
            return;
        }
        let restore = tokio::spawn(async move {
            sleep(remaining).await;
            control.set_idle(glyph);
        });
        let mut restores = self
            .restores
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        restores.retain(|pending| !pending.is_finished());
        restores.push(restore);
    }

    /// Resolves once every control bound by an earlier dispatch is idle again.
    pub async fn settled(&self) {
        let pending = std::mem::take(
            &mut *self.restores.lock().unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for restore in pending {
            if let Err(err) = restore.await {
                debug!(error = %err, "control restore did not complete");
            }
        }
    }
}

fn normalize(response: HttpResponse) -> Result<Reply, ApiError> {
    if !response.is_success() {
        let status = response.status;
        return Err(match serde_json::from_slice::<ErrorEnvelope>(&response.body) {
            Ok(envelope) => envelope
                .message()
                .map(ApiError::new)
                .unwrap_or_else(|| ApiError::new(format!("Server error: {status}"))),
            Err(_) => ApiError::http_status(status),
        });
    }

    if response.is_empty_ack() {
        return Ok(Reply::EmptyAck);
    }

    serde_json::from_slice(&response.body)
        .map(Reply::Json)
        .map_err(|err| ApiError::new(format!("Invalid JSON in response: {err}")))
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
