//! Event publishing/subscription abstraction (mechanics only).
//!
//! Two kinds of consumer are supported:
//!
//! - **Handlers** run inline, on the publisher's task, before `publish` returns.
//!   They are for reactions that must be complete by the time the publisher
//!   continues (e.g. resetting the session before a failed call returns).
//! - **Subscriptions** receive a copy of every message on a channel and drain
//!   it at their own pace (observers, renderers, tests).
//!
//! Messages are delivered in publish order per publisher. There is no
//! persistence and no replay: a subscription only sees messages published
//! after it was created.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};

/// A subscription to an event stream.
///
/// ```ignore
/// let subscription = bus.subscribe();
/// while let Ok(event) = subscription.try_recv() {
///     observe(event);
/// }
/// ```
///
/// Subscriptions are designed for single-consumer use.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Everything published since the last drain, oldest first.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Inline consumer of bus messages.
///
/// Handlers must not block and must not publish on the same bus from inside
/// `handle`.
pub trait EventHandler<M>: Send + Sync {
    fn handle(&self, message: &M);
}

impl<M, F> EventHandler<M> for F
where
    F: Fn(&M) + Send + Sync,
{
    fn handle(&self, message: &M) {
        self(message)
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// The trait requires `Send + Sync` so a single bus can be shared between the
/// gateway, the coordinator and any number of concurrent in-flight calls.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    /// Run every registered handler, then fan the message out to subscriptions.
    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;

    /// Register an inline handler for the lifetime of the bus.
    fn register(&self, handler: Arc<dyn EventHandler<M>>);
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }

    fn register(&self, handler: Arc<dyn EventHandler<M>>) {
        (**self).register(handler)
    }
}
