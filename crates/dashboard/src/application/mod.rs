//! Application layer - Use cases and orchestration

pub mod api;
pub mod error;
pub mod fetcher;
pub mod mutations;
pub mod services;

pub use api::Api;
pub use error::ServiceError;
pub use fetcher::ApiQueryFetcher;
