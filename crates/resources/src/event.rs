use serde::{Deserialize, Serialize};

use gridcat_events::{Event, Topic};

use crate::resource::Resource;

/// Snapshot of a resource as it was right after a successful store write.
///
/// Published for creates, full updates and (optionally) partial updates on the
/// single-change topic, and once per resource on the bulk topic during a
/// republish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEvent {
    resource: Resource,
}

impl ResourceEvent {
    pub fn new(resource: Resource) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn into_resource(self) -> Resource {
        self.resource
    }
}

impl Event for ResourceEvent {
    fn event_type(&self) -> &'static str {
        "catalog.resource.snapshot"
    }

    fn version(&self) -> u32 {
        1
    }
}

/// Topic names the resource service publishes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTopics {
    pub single_change: Topic,
    pub bulk: Topic,
}

impl ResourceTopics {
    pub const DEFAULT_SINGLE_CHANGE: &'static str = "notificationTopic";
    pub const DEFAULT_BULK: &'static str = "notificationTopicAllData";

    pub fn new(single_change: impl Into<Topic>, bulk: impl Into<Topic>) -> Self {
        Self {
            single_change: single_change.into(),
            bulk: bulk.into(),
        }
    }
}

impl Default for ResourceTopics {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SINGLE_CHANGE, Self::DEFAULT_BULK)
    }
}
