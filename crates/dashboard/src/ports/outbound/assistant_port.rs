//! Assistant webhook port

use super::ApiError;

/// Sends a prompt to the assistant webhook and returns the raw response body.
///
/// Shape detection happens in `AssistantReply`, not in adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AssistantPort: Send + Sync {
    async fn ask(&self, prompt: &str) -> Result<String, ApiError>;
}
