//! Registry of mutations whose remote call has not resolved yet

use std::collections::HashMap;

use uuid::Uuid;

use super::policy::MutationKind;
use crate::ports::{QueryData, QueryKey};

/// Lifecycle of one mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Committed,
    RolledBack,
    Abandoned,
}

/// Everything needed to settle a mutation once its remote call resolves
#[derive(Debug, Clone)]
pub struct PendingMutation {
    pub id: Uuid,
    pub kind: MutationKind,
    pub key: QueryKey,
    /// Entry value before the optimistic write, if anything was cached
    pub snapshot: Option<QueryData>,
    /// Value written optimistically, if the transform produced one
    pub tentative: Option<QueryData>,
    /// Cache epoch the mutation started in
    pub epoch: u64,
}

impl PendingMutation {
    /// Whether the cache holds an optimistic value that a rollback must undo
    pub fn wrote_optimistically(&self) -> bool {
        self.snapshot.is_some() && self.tentative.is_some()
    }
}

/// Pending mutation tracker.
///
/// A record is removed exactly once; whoever removes it settles the mutation.
#[derive(Debug, Default)]
pub struct PendingMutations {
    inner: HashMap<Uuid, PendingMutation>,
}

impl PendingMutations {
    pub fn insert(&mut self, mutation: PendingMutation) {
        self.inner.insert(mutation.id, mutation);
    }

    /// Remove a record so it can be settled.
    ///
    /// Returns `None` if it was already taken (for example by `clear`).
    pub fn take(&mut self, id: Uuid) -> Option<PendingMutation> {
        let taken = self.inner.remove(&id);
        if taken.is_none() {
            tracing::debug!(mutation_id = %id, "Mutation already settled");
        }
        taken
    }

    pub fn state(&self, id: Uuid) -> Option<MutationState> {
        self.inner.contains_key(&id).then_some(MutationState::Pending)
    }

    /// Number of pending mutations targeting `key`
    pub fn count_for(&self, key: &QueryKey) -> usize {
        self.inner.values().filter(|m| &m.key == key).count()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) -> usize {
        let count = self.inner.len();
        self.inner.clear();
        count
    }
}
