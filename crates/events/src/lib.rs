//! Change events and in-process change notification.
//!
//! State owners (the cart store) publish what changed; presentation code
//! subscribes instead of polling or reaching into shared globals.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
