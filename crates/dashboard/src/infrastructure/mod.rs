//! Infrastructure layer: HTTP adapters, configuration and the query cache.

pub mod assistant_client;
pub mod cache;
pub mod config;
pub mod http_client;
pub mod retry;

#[cfg(test)]
pub mod testing;

pub use assistant_client::WebhookAssistant;
pub use cache::{CacheConfig, CacheEvent, QueryCache, QueryState};
pub use config::{ConfigError, DashboardConfig};
pub use http_client::ApiAdapter;
pub use retry::RetryConfig;
