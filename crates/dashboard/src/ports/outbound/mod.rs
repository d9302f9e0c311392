//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing the query cache and application services to talk to the backend
//! without depending on concrete HTTP clients.

pub mod api_port;
pub mod assistant_port;
pub mod query_fetcher_port;
pub mod raw_api_port;

pub use api_port::ApiError;
pub use assistant_port::AssistantPort;
pub use query_fetcher_port::{FetchError, QueryFetcher};
pub use raw_api_port::RawApiPort;

#[cfg(test)]
pub use assistant_port::MockAssistantPort;
#[cfg(test)]
pub use query_fetcher_port::MockQueryFetcher;
#[cfg(test)]
pub use raw_api_port::MockRawApiPort;
