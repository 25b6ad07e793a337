//! Infrastructure layer: storage, transports, workers and the resource service.

pub mod event_bus;
pub mod service;
pub mod store;
pub mod workers;

pub use service::{BulkPublishReport, PartialUpdatePolicy, ResourceService, ServiceError, ServiceResult};
pub use store::{InMemoryResourceStore, PostgresResourceStore, ResourceStore, StoreError};
pub use workers::{BackgroundPublisher, SubscriptionWorker, WorkerHandle};
