//! Shared interaction state with typed change channels.
//!
//! The view state is the single mutable shared resource of the pipeline.
//! It is mutated only through its setters; readers subscribe to a channel
//! and receive an immutable snapshot on every change. Subscriptions are
//! RAII handles: dropping one removes the listener, so teardown releases
//! everything deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::data_types::ViewBounds;

/// Named change channels. A setter only notifies its own channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    DataView,
    Interaction,
    Animation,
}

/// Immutable copy of the state handed to subscribers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewStateSnapshot {
    pub bounds: Option<ViewBounds>,
    pub interaction_in_progress: bool,
    pub animation_enabled: bool,
}

type Handler = Arc<Mutex<dyn FnMut(&ViewStateSnapshot) + Send>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SubscriptionId(u64);

#[derive(Default)]
struct Inner {
    snapshot: ViewStateSnapshot,
    next_id: u64,
    handlers: HashMap<Channel, Vec<(SubscriptionId, Handler)>>,
}

#[derive(Default)]
pub struct ViewState {
    inner: Mutex<Inner>,
}

impl ViewState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self) -> ViewStateSnapshot {
        self.inner.lock().snapshot
    }

    /// Sets or clears the zoom/pan bounds. Fires `Channel::DataView`.
    pub fn set_bounds(&self, bounds: Option<ViewBounds>) {
        let snapshot = {
            let mut inner = self.inner.lock();
            inner.snapshot.bounds = bounds;
            inner.snapshot
        };
        self.notify(Channel::DataView, &snapshot);
    }

    /// Marks an interactive gesture as started/finished. Fires
    /// `Channel::Interaction`.
    pub fn set_interaction(&self, in_progress: bool) {
        let snapshot = {
            let mut inner = self.inner.lock();
            inner.snapshot.interaction_in_progress = in_progress;
            inner.snapshot
        };
        self.notify(Channel::Interaction, &snapshot);
    }

    /// Toggles animated transitions. Fires `Channel::Animation`.
    pub fn set_animation(&self, enabled: bool) {
        let snapshot = {
            let mut inner = self.inner.lock();
            inner.snapshot.animation_enabled = enabled;
            inner.snapshot
        };
        self.notify(Channel::Animation, &snapshot);
    }

    pub fn subscribe(
        self: &Arc<Self>,
        channel: Channel,
        handler: impl FnMut(&ViewStateSnapshot) + Send + 'static,
    ) -> Subscription {
        let handler: Handler = Arc::new(Mutex::new(handler));
        let id = {
            let mut inner = self.inner.lock();
            let id = SubscriptionId(inner.next_id);
            inner.next_id += 1;
            inner
                .handlers
                .entry(channel)
                .or_default()
                .push((id, handler));
            id
        };
        Subscription {
            state: Arc::downgrade(self),
            channel,
            id,
        }
    }

    fn notify(&self, channel: Channel, snapshot: &ViewStateSnapshot) {
        // Clone the handler list so callbacks can mutate subscriptions
        // without deadlocking against the state lock.
        let handlers: Vec<Handler> = {
            let inner = self.inner.lock();
            inner
                .handlers
                .get(&channel)
                .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default()
        };
        for handler in handlers {
            (&mut *handler.lock())(snapshot);
        }
    }

    fn unsubscribe(&self, channel: Channel, id: SubscriptionId) {
        let mut inner = self.inner.lock();
        if let Some(handlers) = inner.handlers.get_mut(&channel) {
            handlers.retain(|(hid, _)| *hid != id);
        }
    }
}

/// Owned listener registration; dropping it removes the listener.
pub struct Subscription {
    state: Weak<ViewState>,
    channel: Channel,
    id: SubscriptionId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.unsubscribe(self.channel, self.id);
        }
    }
}
