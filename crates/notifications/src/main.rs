use anyhow::Context;

use gridcat_infra::event_bus::RedisPubSubEventBus;
use gridcat_notifications::{ConsumerConfig, LoggingNotifier, NotificationListener};
use gridcat_resources::ResourceEvent;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gridcat_observability::init_from_env();

    let config = ConsumerConfig::from_env()?;

    let bus = RedisPubSubEventBus::<ResourceEvent>::new(&config.redis_url)
        .context("invalid REDIS_URL")?;
    let probe = bus.clone();
    tokio::task::spawn_blocking(move || probe.ping())
        .await?
        .context("redis is not reachable")?;

    let listener = NotificationListener::spawn(&bus, &config.topics, LoggingNotifier);
    tracing::info!(
        single_change = %config.topics.single_change,
        bulk = %config.topics.bulk,
        "notification consumer listening"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    tracing::info!("shutting down notification consumer");
    tokio::task::spawn_blocking(move || listener.shutdown()).await?;
    Ok(())
}
