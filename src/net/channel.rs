//! Channel adapter contract between the session and the transport.
//!
//! DESIGN
//! ======
//! Outbound: the session holds something implementing [`Channel`] and calls
//! `emit` fire-and-forget. The websocket adapter implements it with an
//! unbounded sender drained by the connection task.
//!
//! Inbound: the connection task publishes every decoded event into a
//! [`Subscriptions`] registry. Each subscriber gets its own unbounded,
//! order-preserving queue, so independent subscriptions to the same event
//! all see every payload. Streams end only when the registry is closed,
//! which happens when the connection goes away.

#[cfg(test)]
#[path = "channel_test.rs"]
mod channel_test;

use std::sync::{Arc, Mutex, PoisonError};

use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};
use wire::{Inbound, Outbound, event};

/// Outbound half of the event channel.
pub trait Channel {
    /// Queue an event for the server. Delivery is not reported back.
    fn emit(&self, event: Outbound);
}

impl<C: Channel + ?Sized> Channel for &C {
    fn emit(&self, event: Outbound) {
        (**self).emit(event);
    }
}

impl Channel for mpsc::UnboundedSender<Outbound> {
    fn emit(&self, event: Outbound) {
        let name = event.name();
        if self.unbounded_send(event).is_err() {
            debug!(event = name, "connection closed; emit dropped");
        }
    }
}

/// A stream of `(event name, payload)` pairs.
pub type Subscription = mpsc::UnboundedReceiver<(String, Value)>;

struct Subscriber {
    names: Vec<String>,
    tx: mpsc::UnboundedSender<(String, Value)>,
}

/// Registry of live inbound subscriptions.
#[derive(Clone, Default)]
pub struct Subscriptions {
    inner: Arc<Mutex<Vec<Subscriber>>>,
}

impl Subscriptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads of every future `name` event.
    pub fn subscribe(&self, name: &str) -> impl Stream<Item = Value> + use<> {
        self.subscribe_many(&[name]).map(|(_, payload)| payload)
    }

    /// Events matching any of `names`, in delivery order across names.
    pub fn subscribe_many(&self, names: &[&str]) -> Subscription {
        let (tx, rx) = mpsc::unbounded();
        let names = names.iter().map(|n| (*n).to_owned()).collect();
        self.lock().push(Subscriber { names, tx });
        rx
    }

    /// Deliver one event to every interested subscriber.
    ///
    /// Subscribers whose stream has been dropped are pruned. Returns the
    /// number of deliveries.
    pub fn publish(&self, name: &str, payload: &Value) -> usize {
        let mut delivered = 0;
        self.lock().retain(|sub| {
            if !sub.names.iter().any(|n| n == name) {
                return !sub.tx.is_closed();
            }
            let ok = sub.tx.unbounded_send((name.to_owned(), payload.clone())).is_ok();
            if ok {
                delivered += 1;
            }
            ok
        });
        delivered
    }

    /// End every subscription stream.
    pub fn close(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decoded stream of every event the session consumes.
///
/// Payloads that do not match the protocol are logged and skipped.
pub fn inbound_events(subscriptions: &Subscriptions) -> impl Stream<Item = Inbound> + use<> {
    subscriptions.subscribe_many(&event::INBOUND).filter_map(|(name, payload)| {
        let decoded = match Inbound::decode(&name, payload) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(event = %name, error = %e, "dropping malformed inbound event");
                None
            }
        };
        futures::future::ready(decoded)
    })
}

/// Channel that keeps every emitted event, for tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingChannel {
    sent: std::cell::RefCell<Vec<Outbound>>,
}

#[cfg(test)]
impl RecordingChannel {
    pub(crate) fn sent(&self) -> Vec<Outbound> {
        self.sent.borrow().clone()
    }

    pub(crate) fn names(&self) -> Vec<&'static str> {
        self.sent.borrow().iter().map(Outbound::name).collect()
    }

    pub(crate) fn clear(&self) {
        self.sent.borrow_mut().clear();
    }
}

#[cfg(test)]
impl Channel for RecordingChannel {
    fn emit(&self, event: Outbound) {
        self.sent.borrow_mut().push(event);
    }
}
