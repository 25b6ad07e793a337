use chrono::{DateTime, Utc};
use serde::Serialize;

use gridcat_events::Topic;
use gridcat_resources::Resource;

/// Which stream a notification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A single create/update.
    Change,
    /// One resource out of a bulk republish.
    Snapshot,
}

/// A received catalog event, ready for side effects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub topic: Topic,
    pub received_at: DateTime<Utc>,
    pub resource: Resource,
}

impl Notification {
    pub fn new(kind: NotificationKind, topic: Topic, resource: Resource) -> Self {
        Self {
            kind,
            topic,
            received_at: Utc::now(),
            resource,
        }
    }
}
