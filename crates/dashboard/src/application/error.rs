//! Service layer error types

use prometeo_domain::DomainError;

use crate::ports::outbound::{ApiError, FetchError};
use crate::ports::{QueryData, QueryKey};

/// Errors that can occur in service operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// Operator input rejected before anything was sent
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// A cached query could not be loaded
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A direct REST call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No assistant webhook is configured
    #[error("Assistant is not configured")]
    AssistantUnavailable,
}

impl ServiceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }

    /// Unwrap cached data into the type the caller expects for `key`
    pub(crate) fn expect_data<T>(key: &QueryKey, data: QueryData) -> Result<T, ServiceError>
    where
        T: TryFrom<QueryData, Error = QueryData>,
    {
        T::try_from(data).map_err(|other| {
            ServiceError::Fetch(FetchError::UnexpectedPayload {
                key: key.clone(),
                actual: other.family(),
            })
        })
    }
}
