//! Query fetcher port - where the query cache gets fresh values from

use crate::query_types::{QueryData, QueryFamily, QueryKey};

use super::ApiError;

/// Error recorded on a cache entry when a fetch fails.
///
/// Cloneable so the same error can sit in the entry and be handed to every
/// waiter of that fetch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The payload decoded, but into the wrong kind of data for the key
    #[error("Unexpected payload for {key}: got {actual:?}")]
    UnexpectedPayload { key: QueryKey, actual: QueryFamily },

    /// The cache was disposed before the fetch could complete
    #[error("Query cache disposed")]
    Disposed,

    /// No async runtime was available to run the background fetch
    #[error("Background fetch could not be scheduled: {0}")]
    Spawn(String),
}

impl FetchError {
    /// Whether a background retry is worth attempting
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Api(e) => e.is_transient(),
            FetchError::UnexpectedPayload { .. } | FetchError::Disposed | FetchError::Spawn(_) => {
                false
            }
        }
    }
}

/// Resolves a query key to its current value on the backend
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait QueryFetcher: Send + Sync {
    async fn fetch(&self, key: &QueryKey) -> Result<QueryData, FetchError>;
}
