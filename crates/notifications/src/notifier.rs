use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use gridcat_core::Entity;

use gridcat_events::Topic;

use crate::notification::{Notification, NotificationKind};

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Catalog events always carry stored resources; one without an id means
    /// the producer is broken and the notification is not delivered.
    #[error("notification on '{0}' carries a resource that was never saved")]
    UnsavedResource(Topic),
}

/// Side effect performed for every received notification.
///
/// Runs on a listener worker thread; implementations may block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

impl<N> Notifier for Arc<N>
where
    N: Notifier + ?Sized,
{
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).notify(notification)
    }
}

/// Writes every notification to the log.
///
/// Stands in for an e-mail or push channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let Some(resource_id) = notification.resource.id().map(|id| id.get()) else {
            return Err(NotifyError::UnsavedResource(notification.topic.clone()));
        };
        let resource = format!("{:?}", notification.resource);

        match notification.kind {
            NotificationKind::Change => info!(
                topic = %notification.topic,
                resource_id,
                resource = %resource,
                "Received notification from ResourceService"
            ),
            NotificationKind::Snapshot => info!(
                topic = %notification.topic,
                resource_id,
                resource = %resource,
                "Received AllData notification from ResourceService"
            ),
        }
        Ok(())
    }
}
