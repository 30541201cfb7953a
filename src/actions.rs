//! Gesture/action bus.
//!
//! The bus only carries brush gesture events emitted by the selection
//! layer; the pipeline reacts to them and never emits them itself.
//! Listener registrations are RAII handles so a component re-attaching
//! drops its old handlers first and duplicates cannot accumulate.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::data_types::Axis;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    RangeStart,
    XRange,
    YRange,
    RangeHighlightClear,
    SelectionClear,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BrushEvent {
    RangeStart,
    AxisRange { range: (f64, f64), axis: Axis },
    RangeHighlightClear,
    SelectionClear,
}

impl BrushEvent {
    pub fn kind(&self) -> GestureKind {
        match self {
            BrushEvent::RangeStart => GestureKind::RangeStart,
            BrushEvent::AxisRange { axis: Axis::X, .. } => GestureKind::XRange,
            BrushEvent::AxisRange { axis: Axis::Y, .. } => GestureKind::YRange,
            BrushEvent::RangeHighlightClear => GestureKind::RangeHighlightClear,
            BrushEvent::SelectionClear => GestureKind::SelectionClear,
        }
    }
}

type Handler = Arc<Mutex<dyn FnMut(&BrushEvent) + Send>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ListenerId(u64);

#[derive(Default)]
struct Inner {
    next_id: u64,
    listeners: HashMap<GestureKind, Vec<(ListenerId, Handler)>>,
}

#[derive(Default)]
pub struct ActionBus {
    inner: Mutex<Inner>,
}

impl ActionBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn subscribe(
        self: &Arc<Self>,
        kind: GestureKind,
        handler: impl FnMut(&BrushEvent) + Send + 'static,
    ) -> BusSubscription {
        let handler: Handler = Arc::new(Mutex::new(handler));
        let id = {
            let mut inner = self.inner.lock();
            let id = ListenerId(inner.next_id);
            inner.next_id += 1;
            inner.listeners.entry(kind).or_default().push((id, handler));
            id
        };
        BusSubscription {
            bus: Arc::downgrade(self),
            kind,
            id,
        }
    }

    pub fn emit(&self, event: &BrushEvent) {
        let handlers: Vec<Handler> = {
            let inner = self.inner.lock();
            inner
                .listeners
                .get(&event.kind())
                .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default()
        };
        for handler in handlers {
            (&mut *handler.lock())(event);
        }
    }

    pub fn listener_count(&self, kind: GestureKind) -> usize {
        self.inner
            .lock()
            .listeners
            .get(&kind)
            .map_or(0, |hs| hs.len())
    }

    fn unsubscribe(&self, kind: GestureKind, id: ListenerId) {
        let mut inner = self.inner.lock();
        if let Some(handlers) = inner.listeners.get_mut(&kind) {
            handlers.retain(|(hid, _)| *hid != id);
        }
    }
}

/// Owned listener registration; dropping it removes the listener.
pub struct BusSubscription {
    bus: Weak<ActionBus>,
    kind: GestureKind,
    id: ListenerId,
}

impl Drop for BusSubscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.kind, self.id);
        }
    }
}
