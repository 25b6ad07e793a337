use std::sync::{Arc, Mutex};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use gridcat_events::{BusPublisher, EventPublisher, InMemoryEventBus};
use gridcat_infra::{
    event_bus::RedisPubSubEventBus, BackgroundPublisher, InMemoryResourceStore, PostgresResourceStore,
    ResourceService, ResourceStore, WorkerHandle,
};
use gridcat_notifications::{ListenerHandle, LoggingNotifier, NotificationListener};
use gridcat_resources::ResourceEvent;

use crate::config::AppConfig;

pub type DynResourceStore = Arc<dyn ResourceStore>;
pub type DynPublisher = Arc<dyn EventPublisher<ResourceEvent>>;

/// The resource service as wired for this process (store and transport erased).
pub type AppResourceService = ResourceService<DynResourceStore, DynPublisher>;

/// Everything the HTTP handlers need, plus the background workers the
/// process owns.
pub struct AppServices {
    resources: AppResourceService,
    local_bus: Option<Arc<InMemoryEventBus<ResourceEvent>>>,
    publish_worker: Mutex<Option<WorkerHandle>>,
    listener: Mutex<Option<ListenerHandle>>,
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices")
            .field("topics", self.resources.topics())
            .field("partial_updates", &self.resources.partial_update_policy())
            .field("local_bus", &self.local_bus.is_some())
            .finish()
    }
}

impl AppServices {
    pub fn resources(&self) -> &AppResourceService {
        &self.resources
    }

    /// The in-process bus, when no external broker is configured.
    pub fn local_bus(&self) -> Option<&Arc<InMemoryEventBus<ResourceEvent>>> {
        self.local_bus.as_ref()
    }

    /// In-memory store + in-memory bus, without a notification listener.
    ///
    /// Used by tests that want to observe the bus themselves.
    pub fn in_memory(config: &AppConfig) -> Self {
        let bus: Arc<InMemoryEventBus<ResourceEvent>> = Arc::new(InMemoryEventBus::new());
        let store: DynResourceStore = Arc::new(InMemoryResourceStore::new());
        let publisher: DynPublisher = Arc::new(BusPublisher::new(bus.clone()));

        Self {
            resources: service(config, store, publisher),
            local_bus: Some(bus),
            publish_worker: Mutex::new(None),
            listener: Mutex::new(None),
        }
    }

    /// Stop background workers; queued events are flushed first.
    pub fn shutdown(&self) {
        if let Some(worker) = self.publish_worker.lock().ok().and_then(|mut w| w.take()) {
            info!(worker = worker.name(), "stopping publish worker");
            worker.shutdown();
        }
        if let Some(listener) = self.listener.lock().ok().and_then(|mut l| l.take()) {
            info!("stopping notification listener");
            listener.shutdown();
        }
    }
}

fn service(config: &AppConfig, store: DynResourceStore, publisher: DynPublisher) -> AppResourceService {
    ResourceService::new(store, publisher)
        .with_topics(config.topics.clone())
        .with_partial_update_policy(config.partial_updates)
}

/// Wire store and transport from configuration.
///
/// - `DATABASE_URL` set: Postgres store (schema bootstrapped), otherwise in-memory
/// - `REDIS_URL` set: Redis pub/sub behind a background publisher, otherwise an
///   in-memory bus with an in-process notification listener
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: DynResourceStore = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            let store = PostgresResourceStore::new(pool);
            store
                .ensure_schema()
                .await
                .context("failed to bootstrap the catalog schema")?;
            info!("using Postgres resource store");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; resources are kept in memory");
            Arc::new(InMemoryResourceStore::new())
        }
    };

    match &config.redis_url {
        Some(redis_url) => {
            let bus = RedisPubSubEventBus::<ResourceEvent>::new(redis_url).context("invalid REDIS_URL")?;
            let probe = bus.clone();
            tokio::task::spawn_blocking(move || probe.ping())
                .await?
                .context("redis is not reachable")?;

            let (publisher, worker) = BackgroundPublisher::spawn("resource-publisher", bus);
            info!("publishing resource events to redis");

            Ok(AppServices {
                resources: service(config, store, Arc::new(publisher)),
                local_bus: None,
                publish_worker: Mutex::new(Some(worker)),
                listener: Mutex::new(None),
            })
        }
        None => {
            let bus: Arc<InMemoryEventBus<ResourceEvent>> = Arc::new(InMemoryEventBus::new());
            let listener = NotificationListener::spawn(&bus, &config.topics, LoggingNotifier);
            let publisher: DynPublisher = Arc::new(BusPublisher::new(bus.clone()));
            info!("REDIS_URL not set; resource events stay in-process");

            Ok(AppServices {
                resources: service(config, store, publisher),
                local_bus: Some(bus),
                publish_worker: Mutex::new(None),
                listener: Mutex::new(Some(listener)),
            })
        }
    }
}
