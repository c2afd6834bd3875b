//! `trafficdesk-events`: process-local publish/subscribe.
//!
//! Transport code announces outcomes (e.g. "the server no longer recognises
//! this session") on a bus; coordination code decides what those outcomes
//! mean for navigation and state. Neither side imports the other.

pub mod bus;
pub mod in_memory_bus;

pub use bus::{EventBus, EventHandler, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
