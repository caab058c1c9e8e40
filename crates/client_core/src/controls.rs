use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::trace;

use crate::bindings::{ControlBinding, ControlId, Glyph, BINDINGS};

/// `set_busy`/`set_idle` bracket a dispatch; `set_enabled` is owned by the
/// reconcilers. A control accepts input only while enabled and not busy.
pub trait Control: Send + Sync {
    fn set_busy(&self, glyph: Glyph);
    fn set_idle(&self, glyph: Glyph);
    fn set_enabled(&self, enabled: bool);
}

#[derive(Clone, Default)]
pub struct ControlRegistry {
    controls: BTreeMap<ControlId, Arc<dyn Control>>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ControlId, control: Arc<dyn Control>) {
        self.controls.insert(id, control);
    }

    pub fn get(&self, id: ControlId) -> Option<&Arc<dyn Control>> {
        self.controls.get(&id)
    }

    pub fn set_enabled(&self, id: ControlId, enabled: bool) {
        if let Some(control) = self.get(id) {
            control.set_enabled(enabled);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSnapshot {
    pub glyph: Glyph,
    pub busy: bool,
    pub enabled: bool,
    pub pulses: u32,
}

impl ControlSnapshot {
    pub fn is_interactive(&self) -> bool {
        self.enabled && !self.busy
    }
}

pub struct HeadlessControl {
    id: ControlId,
    state: Mutex<ControlSnapshot>,
}

impl HeadlessControl {
    pub fn new(id: ControlId, glyph: Glyph) -> Self {
        Self {
            id,
            state: Mutex::new(ControlSnapshot {
                glyph,
                busy: false,
                enabled: true,
                pulses: 0,
            }),
        }
    }

    pub fn snapshot(&self) -> ControlSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ControlSnapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Control for HeadlessControl {
    fn set_busy(&self, glyph: Glyph) {
        let mut state = self.lock();
        state.glyph = glyph;
        state.busy = true;
        trace!(control = %self.id, glyph = glyph.as_str(), "control busy");
    }

    fn set_idle(&self, glyph: Glyph) {
        let mut state = self.lock();
        state.glyph = glyph;
        state.busy = false;
        state.pulses += 1;
        trace!(control = %self.id, glyph = glyph.as_str(), "control idle");
    }

    fn set_enabled(&self, enabled: bool) {
        self.lock().enabled = enabled;
        trace!(control = %self.id, enabled, "control enablement");
    }
}

pub struct HeadlessSurface {
    controls: BTreeMap<ControlId, Arc<HeadlessControl>>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        let controls = BINDINGS
            .iter()
            .map(|ControlBinding { control, idle_glyph, .. }| {
                (*control, Arc::new(HeadlessControl::new(*control, *idle_glyph)))
            })
            .collect();
        Self { controls }
    }

    pub fn registry(&self) -> ControlRegistry {
        let mut registry = ControlRegistry::new();
        for (id, control) in &self.controls {
            registry.register(*id, control.clone());
        }
        registry
    }

    pub fn snapshot(&self, id: ControlId) -> Option<ControlSnapshot> {
        self.controls.get(&id).map(|control| control.snapshot())
    }

    pub fn snapshots(&self) -> Vec<(ControlId, ControlSnapshot)> {
        self.controls
            .iter()
            .map(|(id, control)| (*id, control.snapshot()))
            .collect()
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}
