//! Process configuration, read from environment variables.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use gridcat_infra::PartialUpdatePolicy;
use gridcat_resources::ResourceTopics;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Application configuration loaded from environment variables.
///
/// Without `DATABASE_URL` the catalog lives in memory; without `REDIS_URL`
/// events stay in-process and are consumed by a local notification listener.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub topics: ResourceTopics,
    pub partial_updates: PartialUpdatePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            redis_url: None,
            topics: ResourceTopics::default(),
            partial_updates: PartialUpdatePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:8080")?;

        let notify = match get("NOTIFY_ON_PARTIAL_UPDATE") {
            Some(v) => v
                .trim()
                .parse::<bool>()
                .context("NOTIFY_ON_PARTIAL_UPDATE must be true or false")?,
            None => false,
        };

        let topics = ResourceTopics::new(
            get("RESOURCE_TOPIC").unwrap_or_else(|| ResourceTopics::DEFAULT_SINGLE_CHANGE.to_string()),
            get("RESOURCE_BULK_TOPIC").unwrap_or_else(|| ResourceTopics::DEFAULT_BULK.to_string()),
        );

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            redis_url: get("REDIS_URL"),
            topics,
            partial_updates: PartialUpdatePolicy::from_flag(notify),
        })
    }
}
