//! Messaging mechanics: topics, event bus, publishers.
//!
//! Everything here is domain-agnostic. Payload types live in the domain crates
//! and transport-backed buses live in `gridcat-infra`.

pub mod bus;
pub mod event;
pub mod in_memory_bus;
pub mod publisher;
pub mod topic;

pub use bus::{EventBus, Liveness, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use publisher::{BusPublisher, EventPublisher};
pub use topic::Topic;
