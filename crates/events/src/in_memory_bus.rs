//! In-memory event bus.

use std::sync::{Arc, Mutex, mpsc};

use thiserror::Error;

use crate::bus::{EventBus, EventHandler, Subscription};

#[derive(Debug, Error)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    #[error("event bus lock poisoned")]
    Poisoned,
}

/// In-memory pub/sub bus.
///
/// - No IO / no async
/// - Handlers run inline in registration order
/// - Dead subscriptions are dropped on the next publish
pub struct InMemoryEventBus<M> {
    handlers: Mutex<Vec<Arc<dyn EventHandler<M>>>>,
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().map(|h| h.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> core::fmt::Debug for InMemoryEventBus<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryEventBus")
            .field("handlers", &self.handler_count())
            .finish_non_exhaustive()
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        // Snapshot so a handler may register further handlers without deadlocking.
        let handlers: Vec<_> = self
            .handlers
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?
            .clone();

        for handler in &handlers {
            handler.handle(&message);
        }

        let mut subs = self.subscribers.lock().map_err(|_| InMemoryBusError::Poisoned)?;
        subs.retain(|tx| tx.send(message.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive messages.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        } else {
            tracing::warn!("event bus poisoned; subscription will stay empty");
        }

        Subscription::new(rx)
    }

    fn register(&self, handler: Arc<dyn EventHandler<M>>) {
        match self.handlers.lock() {
            Ok(mut handlers) => handlers.push(handler),
            Err(_) => tracing::error!("event bus poisoned; handler not registered"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn handlers_run_before_publish_returns() {
        let bus = InMemoryEventBus::<u32>::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        bus.register(Arc::new(move |n: &u32| {
            counter.fetch_add(*n as usize, Ordering::SeqCst);
        }));

        bus.publish(3).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn every_subscription_gets_a_copy_in_order() {
        let bus = InMemoryEventBus::<&'static str>::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish("first").unwrap();
        bus.publish("second").unwrap();

        assert_eq!(a.drain(), vec!["first", "second"]);
        assert_eq!(b.drain(), vec!["first", "second"]);
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let bus = InMemoryEventBus::<u8>::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());

        bus.publish(1).unwrap();
        assert_eq!(bus.subscribers.lock().unwrap().len(), 1);
        assert_eq!(kept.drain(), vec![1]);
    }

    #[test]
    fn late_subscribers_miss_earlier_messages() {
        let bus = InMemoryEventBus::<u8>::new();
        bus.publish(1).unwrap();
        let late = bus.subscribe();
        assert!(late.try_recv().is_err());
    }
}
