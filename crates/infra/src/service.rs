//! Resource lifecycle orchestration.
//!
//! `ResourceService` is the only writer of the catalog. Every mutation follows
//! the same order:
//!
//! ```text
//! validate → ResourceStore::save → EventPublisher::publish(topic, snapshot)
//! ```
//!
//! The store write completes before the publish is issued, so a consumer can
//! never observe an event for a mutation that did not persist. Publication is
//! fire-and-forget: a broken transport costs an event, never a mutation.

use core::fmt;

use thiserror::Error;
use tracing::{debug, info, instrument};

use gridcat_core::{DomainError, Entity, ResourceId};
use gridcat_events::{Event, EventPublisher};
use gridcat_resources::{Resource, ResourceEvent, ResourcePatch, ResourceTopics};

use crate::store::{ResourceStore, StoreError};

/// Whether partial updates emit a change event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartialUpdatePolicy {
    /// Partial updates persist without publishing.
    #[default]
    Silent,
    /// Partial updates publish to the single-change topic like full updates.
    Notify,
}

impl PartialUpdatePolicy {
    pub fn from_flag(notify: bool) -> Self {
        if notify { Self::Notify } else { Self::Silent }
    }
}

/// Service-level error.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Resource with id {0} not found")]
    NotFound(ResourceId),

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error(transparent)]
    Store(StoreError),
}

impl ServiceError {
    /// Client-facing messages: one per violation, or the display text otherwise.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Missing(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(messages) => Self::Validation(messages),
            other @ DomainError::InvalidId(_) => Self::Validation(vec![other.to_string()]),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Outcome of a bulk republish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkPublishReport {
    pub published: usize,
}

impl fmt::Display for BulkPublishReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Send {} items from Resource.", self.published)
    }
}

/// CRUD over the resource aggregate with change-event publication.
///
/// Store and publisher are injected; their lifecycle belongs to the process.
#[derive(Debug)]
pub struct ResourceService<S, P> {
    store: S,
    publisher: P,
    topics: ResourceTopics,
    partial_updates: PartialUpdatePolicy,
}

impl<S, P> ResourceService<S, P>
where
    S: ResourceStore,
    P: EventPublisher<ResourceEvent>,
{
    pub fn new(store: S, publisher: P) -> Self {
        Self {
            store,
            publisher,
            topics: ResourceTopics::default(),
            partial_updates: PartialUpdatePolicy::default(),
        }
    }

    pub fn with_topics(mut self, topics: ResourceTopics) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_partial_update_policy(mut self, policy: PartialUpdatePolicy) -> Self {
        self.partial_updates = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn topics(&self) -> &ResourceTopics {
        &self.topics
    }

    pub fn partial_update_policy(&self) -> PartialUpdatePolicy {
        self.partial_updates
    }

    /// Persist a new resource and announce it.
    ///
    /// Any id the caller supplied is ignored: `add` always inserts.
    #[instrument(skip(self, resource), fields(resource_type = %resource.resource_type), err)]
    pub async fn add(&self, resource: Resource) -> ServiceResult<Resource> {
        resource.validate()?;

        let saved = self.store.save(resource.detached()).await?;
        self.announce_change(&saved);

        info!(resource_id = ?saved.id(), "resource added");
        Ok(saved)
    }

    #[instrument(skip(self), fields(resource_id = %id), err)]
    pub async fn get(&self, id: ResourceId) -> ServiceResult<Resource> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Replace an existing resource as a whole and announce it.
    ///
    /// Fields the caller left out are cleared.
    #[instrument(skip(self, resource), fields(resource_id = ?resource.id()), err)]
    pub async fn update(&self, resource: Resource) -> ServiceResult<Resource> {
        if resource.id().is_none() {
            return Err(DomainError::validation("Resource id is required for a full update").into());
        }
        resource.validate()?;

        let saved = self.store.save(resource).await?;
        self.announce_change(&saved);

        info!(resource_id = ?saved.id(), "resource replaced");
        Ok(saved)
    }

    /// Merge the present fields of `patch` into the stored resource.
    ///
    /// Publishes only under `PartialUpdatePolicy::Notify`.
    #[instrument(skip(self, patch), fields(resource_id = %id, policy = ?self.partial_updates), err)]
    pub async fn update_partial(&self, id: ResourceId, patch: ResourcePatch) -> ServiceResult<Resource> {
        let mut resource = self.get(id).await?;
        let saved = if patch.is_empty() {
            debug!(resource_id = %id, "empty patch, store left untouched");
            resource
        } else {
            patch.apply_to(&mut resource);
            resource.validate()?;
            self.store.save(resource).await?
        };
        if self.partial_updates == PartialUpdatePolicy::Notify {
            self.announce_change(&saved);
        }

        info!(resource_id = %id, "resource patched");
        Ok(saved)
    }

    /// Delete a resource. Unknown ids are not an error.
    #[instrument(skip(self), fields(resource_id = %id), err)]
    pub async fn remove(&self, id: ResourceId) -> ServiceResult<()> {
        self.store.delete_by_id(id).await?;
        info!(resource_id = %id, "resource removed");
        Ok(())
    }

    /// Republish every stored resource on the bulk topic.
    #[instrument(skip(self), fields(topic = %self.topics.bulk), err)]
    pub async fn send_all(&self) -> ServiceResult<BulkPublishReport> {
        let resources = self.store.find_all().await?;
        let published = resources.len();

        for resource in resources {
            self.publisher.publish(&self.topics.bulk, ResourceEvent::new(resource));
        }

        let report = BulkPublishReport { published };
        info!(published, "bulk republish issued");
        Ok(report)
    }

    fn announce_change(&self, snapshot: &Resource) {
        let event = ResourceEvent::new(snapshot.clone());
        debug!(
            topic = %self.topics.single_change,
            resource_id = ?snapshot.id(),
            schema = %event.schema(),
            "publishing change event"
        );
        self.publisher.publish(&self.topics.single_change, event);
    }
}
