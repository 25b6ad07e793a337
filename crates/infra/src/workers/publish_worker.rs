use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use gridcat_events::{EventBus, EventPublisher, Topic};

use super::WorkerHandle;

type Publication<M> = (Topic, M);

/// Publisher that hands messages to a dedicated thread which drives the bus.
///
/// `publish` only enqueues, so request handlers never wait on broker IO.
/// Transport failures are logged by the worker and go no further.
///
/// On `WorkerHandle::shutdown` the worker publishes everything still queued
/// before it exits.
#[derive(Debug)]
pub struct BackgroundPublisher<M> {
    queue: mpsc::Sender<Publication<M>>,
}

impl<M> Clone for BackgroundPublisher<M> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<M> BackgroundPublisher<M>
where
    M: Send + 'static,
{
    pub fn spawn<B>(name: &'static str, bus: B) -> (Self, WorkerHandle)
    where
        B: EventBus<M> + 'static,
    {
        let (queue_tx, queue_rx) = mpsc::channel::<Publication<M>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, bus, queue_rx, shutdown_rx))
            .expect("failed to spawn publish worker thread");

        (Self { queue: queue_tx }, WorkerHandle::new(name, shutdown_tx, join))
    }
}

impl<M> EventPublisher<M> for BackgroundPublisher<M>
where
    M: Send + 'static,
{
    fn publish(&self, topic: &Topic, message: M) {
        if self.queue.send((topic.clone(), message)).is_err() {
            warn!(topic = %topic, "publish worker has stopped; event dropped");
        }
    }
}

fn worker_loop<M, B>(
    name: &'static str,
    bus: B,
    queue: mpsc::Receiver<Publication<M>>,
    shutdown_rx: mpsc::Receiver<()>,
) where
    B: EventBus<M>,
{
    let tick = Duration::from_millis(250);

    let deliver = |(topic, message): Publication<M>| {
        if let Err(err) = bus.publish(&topic, message) {
            warn!(worker = name, topic = %topic, error = %err, "event publication failed; mutation is kept");
        }
    };

    loop {
        if shutdown_rx.try_recv().is_ok() {
            let pending: Vec<_> = queue.try_iter().collect();
            debug!(worker = name, pending = pending.len(), "draining publish queue");
            pending.into_iter().for_each(&deliver);
            break;
        }

        match queue.recv_timeout(tick) {
            Ok(publication) => deliver(publication),
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}
