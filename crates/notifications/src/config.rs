use anyhow::{Context, Result};
use dotenvy::dotenv;

use gridcat_resources::ResourceTopics;

/// Configuration of the standalone notification consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub redis_url: String,
    pub topics: ResourceTopics,
}

impl ConsumerConfig {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let redis_url = lookup("REDIS_URL").context("REDIS_URL must be set")?;
        let topics = ResourceTopics::new(
            lookup("RESOURCE_TOPIC").unwrap_or_else(|| ResourceTopics::DEFAULT_SINGLE_CHANGE.to_string()),
            lookup("RESOURCE_BULK_TOPIC").unwrap_or_else(|| ResourceTopics::DEFAULT_BULK.to_string()),
        );

        Ok(Self { redis_url, topics })
    }
}
