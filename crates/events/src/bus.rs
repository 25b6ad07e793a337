//! Event publishing/subscription abstraction (mechanics only).
//!
//! This module provides the **topic-addressed pub/sub pattern** used to mirror
//! catalog mutations onto downstream consumers.
//!
//! ## Delivery Model
//!
//! - **Transport-agnostic**: in-memory channels, Redis pub/sub, brokers
//! - **Best effort**: the store is the system of record; the bus only distributes
//! - **No ordering guarantees across publishers**
//! - **No persistence**: a subscriber that is offline misses messages
//!
//! Consumers must tolerate duplicates and gaps. A backfill is always available
//! through the bulk republish operation of the resource service.

use std::sync::{Arc, Weak};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::topic::Topic;

/// A subscription to one topic of an event bus.
///
/// ## Usage Pattern
///
/// ```ignore
/// let subscription = bus.subscribe(&Topic::new("notificationTopic"));
///
/// loop {
///     match subscription.recv_timeout(Duration::from_secs(1)) {
///         Ok(event) => process(event)?,
///         Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,  // Check for shutdown
///         Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,  // Bus closed
///     }
/// }
/// ```
///
/// Subscriptions are designed for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
    alive: Arc<()>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self {
            receiver,
            alive: Arc::new(()),
        }
    }

    /// Handle a feeding thread polls to learn that this subscription is gone
    /// while no message is flowing.
    pub fn liveness(&self) -> Liveness {
        Liveness(Arc::downgrade(&self.alive))
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain every message that is already queued, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Weak view of a [`Subscription`].
#[derive(Debug, Clone)]
pub struct Liveness(Weak<()>);

impl Liveness {
    pub fn is_dropped(&self) -> bool {
        self.0.strong_count() == 0
    }
}

/// Domain-agnostic, topic-addressed event bus.
///
/// ```text
/// Resource Service → Entity Store (save) → EventBus::publish(topic, event) → Subscribers
/// ```
///
/// Publication always happens **after** the store write has succeeded. If
/// publication fails, the store still holds the mutation and a bulk republish
/// can bring consumers back in sync.
///
/// ## Error Handling
///
/// `publish()` can fail (lock poisoning, network error). The bus surfaces the
/// failure; deciding whether it matters is the job of the `EventPublisher`
/// that wraps the bus (see `publisher.rs`).
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync`; many request handlers publish concurrently.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    fn publish(&self, topic: &Topic, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self, topic: &Topic) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, topic: &Topic, message: M) -> Result<(), Self::Error> {
        (**self).publish(topic, message)
    }

    fn subscribe(&self, topic: &Topic) -> Subscription<M> {
        (**self).subscribe(topic)
    }
}
