//! Redis pub/sub-backed event bus (optional).
//!
//! Each topic maps to the Redis channel of the same name and messages travel
//! as JSON. Redis pub/sub is not durable: a subscriber that is offline misses
//! messages, which matches the best-effort delivery the catalog promises.

use std::marker::PhantomData;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use redis::Commands;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use gridcat_events::{EventBus, Liveness, Subscription, Topic};

/// How long a subscriber thread blocks on the socket before checking whether
/// its subscription was dropped.
const SUBSCRIBER_POLL: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum RedisBusError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Redis pub/sub bus for JSON-serializable messages.
///
/// `publish` opens a blocking connection per call; wrap the bus in a
/// `BackgroundPublisher` to keep that off request handlers.
#[derive(Debug)]
pub struct RedisPubSubEventBus<M> {
    client: redis::Client,
    _message: PhantomData<fn() -> M>,
}

impl<M> Clone for RedisPubSubEventBus<M> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _message: PhantomData,
        }
    }
}

impl<M> RedisPubSubEventBus<M> {
    pub fn new(redis_url: impl AsRef<str>) -> Result<Self, RedisBusError> {
        let client = redis::Client::open(redis_url.as_ref())?;
        Ok(Self {
            client,
            _message: PhantomData,
        })
    }

    /// Round-trip a PING to fail fast on a bad URL at startup.
    pub fn ping(&self) -> Result<(), RedisBusError> {
        let mut conn = self.client.get_connection()?;
        redis::cmd("PING").query::<String>(&mut conn)?;
        Ok(())
    }
}

impl<M> EventBus<M> for RedisPubSubEventBus<M>
where
    M: Serialize + DeserializeOwned + Send + 'static,
{
    type Error = RedisBusError;

    fn publish(&self, topic: &Topic, message: M) -> Result<(), Self::Error> {
        let payload = serde_json::to_string(&message)?;
        let mut conn = self.client.get_connection()?;
        let receivers: i64 = conn.publish(topic.as_str(), payload)?;
        debug!(topic = %topic, receivers, "published to redis channel");
        Ok(())
    }

    fn subscribe(&self, topic: &Topic) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        let subscription = Subscription::new(rx);
        let liveness = subscription.liveness();

        let client = self.client.clone();
        let channel = topic.as_str().to_string();

        // Background thread that receives pub/sub messages and forwards them.
        // It ends when the connection fails or the subscription is dropped.
        thread::spawn(move || forward_channel(&client, &channel, &liveness, &tx));

        subscription
    }
}

fn forward_channel<M: DeserializeOwned>(
    client: &redis::Client,
    channel: &str,
    liveness: &Liveness,
    tx: &mpsc::Sender<M>,
) {
    let mut conn = match client.get_connection() {
        Ok(c) => c,
        Err(err) => {
            warn!(topic = %channel, error = %err, "redis subscription could not connect");
            return;
        }
    };

    let mut pubsub = conn.as_pubsub();
    if let Err(err) = pubsub.subscribe(channel) {
        warn!(topic = %channel, error = %err, "redis subscribe failed");
        return;
    }
    if let Err(err) = pubsub.set_read_timeout(Some(SUBSCRIBER_POLL)) {
        warn!(topic = %channel, error = %err, "redis subscription read timeout not set");
        return;
    }

    loop {
        let msg = match pubsub.get_message() {
            Ok(m) => m,
            Err(err) if err.is_timeout() => {
                if liveness.is_dropped() {
                    debug!(topic = %channel, "redis subscription dropped, leaving channel");
                    return;
                }
                continue;
            }
            Err(err) => {
                warn!(topic = %channel, error = %err, "redis subscription closed");
                return;
            }
        };

        let payload: String = match msg.get_payload() {
            Ok(p) => p,
            Err(_) => continue,
        };

        let message: M = match serde_json::from_str(&payload) {
            Ok(m) => m,
            Err(err) => {
                warn!(topic = %channel, error = %err, "dropping undecodable message");
                continue;
            }
        };

        if tx.send(message).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct Ping(u32);

    #[test]
    #[ignore = "needs REDIS_URL; run with `cargo test -p gridcat-infra --features redis -- --ignored`"]
    fn idle_subscriber_thread_notices_the_drop() {
        let url = std::env::var("REDIS_URL").expect("set REDIS_URL to a disposable Redis");
        let bus = RedisPubSubEventBus::<Ping>::new(url).unwrap();
        let (tx, rx) = mpsc::channel::<Ping>();
        let subscription = Subscription::new(rx);
        let liveness = subscription.liveness();

        let worker = thread::spawn(move || forward_channel(&bus.client, "gridcat.idle", &liveness, &tx));
        thread::sleep(SUBSCRIBER_POLL * 2);
        drop(subscription);

        let deadline = Instant::now() + SUBSCRIBER_POLL * 4;
        while !worker.is_finished() {
            assert!(Instant::now() < deadline, "subscriber thread still blocked after drop");
            thread::sleep(Duration::from_millis(50));
        }
    }
}
