//! Optimistic mutations and the invalidation policy they fan out through

mod mutator;
mod pending;
mod policy;

pub use mutator::{MutationOutcome, OptimisticMutator};
pub use pending::{MutationState, PendingMutation, PendingMutations};
pub use policy::{InvalidationPolicy, MutationKind};
