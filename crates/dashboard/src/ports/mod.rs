//! Dashboard port definitions.

// Re-export query vocabulary from the crate root for convenience.
pub use crate::query_types::{QueryData, QueryFamily, QueryFilter, QueryKey};

pub mod outbound;
