//! Raw API Port - Object-safe HTTP boundary
//!
//! Typed request/response helpers are generic and therefore not object-safe.
//! The composition root stores a `RawApiPort` behind `Arc<dyn ...>`; the
//! application layer wraps it in `Api`, which does the serde_json conversions.

use serde_json::Value;

use super::ApiError;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RawApiPort: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError>;

    async fn put_json(&self, path: &str, body: &Value) -> Result<Value, ApiError>;

    async fn patch_json(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
}
