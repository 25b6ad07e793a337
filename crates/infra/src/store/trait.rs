use std::sync::Arc;

use thiserror::Error;

use gridcat_core::ResourceId;
use gridcat_resources::Resource;

/// Entity store operation error.
///
/// These are **infrastructure errors** (storage, consistency) as opposed to
/// domain errors (validation, lookups by the caller).
///
/// ## Error Categories
///
/// - **Missing**: a replace targeted a resource row that does not exist
/// - **Backend**: the storage backend failed (connection, SQL, lock poisoning)
/// - **Corrupt**: a stored row could not be turned back into a domain value
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resource {0} does not exist")]
    Missing(ResourceId),

    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("corrupt stored row: {0}")]
    Corrupt(String),
}

/// Persistence boundary for the resource aggregate.
///
/// ## Save Semantics
///
/// `save()`:
/// - inserts when the resource has no id, replaces when it has one
/// - upserts the location and every characteristic first, assigning ids to
///   the ones that have none (or whose id the store does not know)
/// - replaces the resource's characteristic links, keeping caller order
/// - is atomic: either the whole aggregate is written or nothing is
/// - returns the fully resolved snapshot with every id assigned
///
/// ## Delete Semantics
///
/// `delete_by_id()` removes the aggregate row and its characteristic links.
/// Location and characteristic rows stay. Deleting an unknown id is a no-op.
///
/// ## Read Semantics
///
/// `find_all()` returns resources in ascending id order.
#[async_trait::async_trait]
pub trait ResourceStore: Send + Sync {
    async fn find_by_id(&self, id: ResourceId) -> Result<Option<Resource>, StoreError>;

    async fn save(&self, resource: Resource) -> Result<Resource, StoreError>;

    async fn delete_by_id(&self, id: ResourceId) -> Result<(), StoreError>;

    async fn find_all(&self) -> Result<Vec<Resource>, StoreError>;
}

#[async_trait::async_trait]
impl<S> ResourceStore for Arc<S>
where
    S: ResourceStore + ?Sized,
{
    async fn find_by_id(&self, id: ResourceId) -> Result<Option<Resource>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn save(&self, resource: Resource) -> Result<Resource, StoreError> {
        (**self).save(resource).await
    }

    async fn delete_by_id(&self, id: ResourceId) -> Result<(), StoreError> {
        (**self).delete_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Resource>, StoreError> {
        (**self).find_all().await
    }
}
