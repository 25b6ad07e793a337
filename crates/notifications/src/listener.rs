use gridcat_events::{EventBus, Topic};
use gridcat_infra::{SubscriptionWorker, WorkerHandle};
use gridcat_resources::{ResourceEvent, ResourceTopics};

use crate::notification::{Notification, NotificationKind};
use crate::notifier::Notifier;

/// Spawns the consumer workers for both catalog topics.
#[derive(Debug)]
pub struct NotificationListener;

impl NotificationListener {
    /// Subscribe to both topics of `topics` and start one worker per topic.
    ///
    /// Subscriptions are registered before this returns, so nothing published
    /// afterwards is missed by an in-process bus.
    pub fn spawn<B, N>(bus: &B, topics: &ResourceTopics, notifier: N) -> ListenerHandle
    where
        B: EventBus<ResourceEvent>,
        N: Notifier + Clone + 'static,
    {
        let change = spawn_worker(
            "notifications.change",
            bus,
            &topics.single_change,
            NotificationKind::Change,
            notifier.clone(),
        );
        let snapshot = spawn_worker(
            "notifications.snapshot",
            bus,
            &topics.bulk,
            NotificationKind::Snapshot,
            notifier,
        );

        ListenerHandle {
            workers: vec![change, snapshot],
        }
    }
}

fn spawn_worker<B, N>(
    name: &'static str,
    bus: &B,
    topic: &Topic,
    kind: NotificationKind,
    notifier: N,
) -> WorkerHandle
where
    B: EventBus<ResourceEvent>,
    N: Notifier + 'static,
{
    let subscription = bus.subscribe(topic);
    let topic = topic.clone();

    SubscriptionWorker::spawn(name, subscription, move |event: ResourceEvent| {
        let notification = Notification::new(kind, topic.clone(), event.into_resource());
        notifier.notify(&notification)
    })
}

/// Handle over the running listener workers.
#[derive(Debug)]
pub struct ListenerHandle {
    workers: Vec<WorkerHandle>,
}

impl ListenerHandle {
    pub fn worker_names(&self) -> Vec<&'static str> {
        self.workers.iter().map(WorkerHandle::name).collect()
    }

    /// Stop and join every worker.
    pub fn shutdown(self) {
        for worker in self.workers {
            worker.shutdown();
        }
    }
}
