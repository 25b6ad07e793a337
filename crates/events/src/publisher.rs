//! Fire-and-forget publication boundary.
//!
//! The resource service never learns whether a publish reached anyone. The
//! publisher accepts the message and owns failure handling: transport errors
//! are logged here and go no further, so a failed publish can never fail the
//! store mutation that preceded it.

use std::sync::Arc;

use tracing::warn;

use crate::bus::EventBus;
use crate::topic::Topic;

/// Accepts messages for delivery on a topic. Infallible from the caller's view.
pub trait EventPublisher<M>: Send + Sync {
    fn publish(&self, topic: &Topic, message: M);
}

impl<M, P> EventPublisher<M> for Arc<P>
where
    P: EventPublisher<M> + ?Sized,
{
    fn publish(&self, topic: &Topic, message: M) {
        (**self).publish(topic, message)
    }
}

/// Publishes straight onto a bus from the calling thread.
///
/// Suitable for buses whose `publish` does not block (e.g. `InMemoryEventBus`).
/// For network transports, prefer the background publisher in `gridcat-infra`.
#[derive(Debug, Clone)]
pub struct BusPublisher<B> {
    bus: B,
}

impl<B> BusPublisher<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

impl<M, B> EventPublisher<M> for BusPublisher<B>
where
    B: EventBus<M>,
{
    fn publish(&self, topic: &Topic, message: M) {
        if let Err(err) = self.bus.publish(topic, message) {
            warn!(topic = %topic, error = %err, "event publication failed; mutation is kept");
        }
    }
}
