//! Prometeo Shared - wire contract between the dashboard client and the API
//!
//! This crate contains the types both sides of the REST boundary agree on:
//! - Request bodies and query parameters
//! - Route builders, relative to the configured base URL
//! - Assistant webhook reply shapes
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, url, and tracing
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Domain vocabulary** - statuses and metrics come from `prometeo-domain`

pub mod assistant;
pub mod requests;
pub mod routes;

pub use assistant::{AssistantReply, ASSISTANT_ERROR_MESSAGE, UNRECOGNIZED_REPLY_MESSAGE};
pub use requests::{ContactsConfigRequest, HeatmapQuery, PageRequest, UpdateClientStatusRequest};
