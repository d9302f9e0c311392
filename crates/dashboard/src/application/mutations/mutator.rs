//! Optimistic mutations over the query cache.
//!
//! A mutation snapshots one cache entry, writes the value it expects the
//! server to end up with, and only then starts the remote call. When the call
//! succeeds the optimistic value stays and every dependent query is
//! invalidated in a single pass. When it fails the snapshot is written back
//! and nothing is invalidated.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::pending::{MutationState, PendingMutation, PendingMutations};
use super::policy::{InvalidationPolicy, MutationKind};
use crate::infrastructure::cache::QueryCache;
use crate::ports::outbound::ApiError;
use crate::ports::{QueryData, QueryKey};

/// How a mutation settled
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The server accepted the change; `invalidated` lists the keys marked stale
    Committed {
        id: Uuid,
        kind: MutationKind,
        invalidated: Vec<QueryKey>,
    },
    /// The server rejected the change or could not be reached.
    /// `restored` is true when an optimistic value was reverted.
    RolledBack {
        id: Uuid,
        kind: MutationKind,
        error: ApiError,
        restored: bool,
    },
    /// The mutation was abandoned before its remote call resolved, so the
    /// cache was left as it was. `error` is set when the call failed.
    Abandoned {
        id: Uuid,
        kind: MutationKind,
        error: Option<ApiError>,
    },
}

impl MutationOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            MutationOutcome::Committed { id, .. }
            | MutationOutcome::RolledBack { id, .. }
            | MutationOutcome::Abandoned { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            MutationOutcome::Committed { kind, .. }
            | MutationOutcome::RolledBack { kind, .. }
            | MutationOutcome::Abandoned { kind, .. } => *kind,
        }
    }

    pub fn state(&self) -> MutationState {
        match self {
            MutationOutcome::Committed { .. } => MutationState::Committed,
            MutationOutcome::RolledBack { .. } => MutationState::RolledBack,
            MutationOutcome::Abandoned { .. } => MutationState::Abandoned,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, MutationOutcome::Committed { .. })
    }

    /// The remote call's failure, whether or not it was rolled back
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            MutationOutcome::RolledBack { error, .. } => Some(error),
            MutationOutcome::Abandoned { error, .. } => error.as_ref(),
            MutationOutcome::Committed { .. } => None,
        }
    }

    /// Keys invalidated on success, or the remote call's error
    pub fn into_result(self) -> Result<Vec<QueryKey>, ApiError> {
        match self {
            MutationOutcome::Committed { invalidated, .. } => Ok(invalidated),
            MutationOutcome::RolledBack { error, .. }
            | MutationOutcome::Abandoned {
                error: Some(error), ..
            } => Err(error),
            MutationOutcome::Abandoned { error: None, .. } => Ok(Vec::new()),
        }
    }
}

/// Applies mutations optimistically and settles each exactly once
#[derive(Clone)]
pub struct OptimisticMutator {
    cache: QueryCache,
    policy: Arc<InvalidationPolicy>,
    pending: Arc<Mutex<PendingMutations>>,
}

impl OptimisticMutator {
    pub fn new(cache: QueryCache, policy: InvalidationPolicy) -> Self {
        Self {
            cache,
            policy: Arc::new(policy),
            pending: Arc::new(Mutex::new(PendingMutations::default())),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn policy(&self) -> &InvalidationPolicy {
        &self.policy
    }

    /// Number of mutations still waiting on their remote call
    pub fn pending_count(&self) -> usize {
        self.lock_pending().len()
    }

    pub fn pending_for(&self, key: &QueryKey) -> usize {
        self.lock_pending().count_for(key)
    }

    /// Forget every pending mutation. Calls still in flight settle without
    /// touching the cache.
    pub fn abandon_pending(&self) -> usize {
        let abandoned = self.lock_pending().clear();
        if abandoned > 0 {
            tracing::info!(abandoned, "Abandoned pending mutations");
        }
        abandoned
    }

    /// Run one optimistic mutation against the entry at `key`.
    ///
    /// `transform` computes the tentative value from the cached one and may
    /// decline with `None` (nothing is written then). `remote_call` is only
    /// invoked after the tentative value is visible to readers.
    ///
    /// Dropping the returned future before the call resolves rolls the
    /// optimistic value back and forgets the mutation.
    pub async fn mutate<T, F, Fut>(
        &self,
        kind: MutationKind,
        key: QueryKey,
        transform: T,
        remote_call: F,
    ) -> MutationOutcome
    where
        T: FnOnce(&QueryData) -> Option<QueryData> + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<(), ApiError>> + Send,
    {
        let id = Uuid::new_v4();
        let epoch = self.cache.epoch();
        let snapshot = self.cache.peek(&key);
        let mut tentative = snapshot.as_ref().and_then(transform);

        if let Some(value) = &tentative {
            if !self.cache.write_in_epoch(key.clone(), value.clone(), epoch) {
                tentative = None;
            }
        }
        tracing::debug!(
            mutation_id = %id,
            kind = kind.as_str(),
            key = %key,
            optimistic = tentative.is_some(),
            "Mutation pending"
        );
        self.lock_pending().insert(PendingMutation {
            id,
            kind,
            key,
            snapshot,
            tentative,
            epoch,
        });

        let guard = DropGuard {
            mutator: self,
            id,
            armed: true,
        };
        let result = remote_call().await;
        guard.disarm();

        let taken = self.lock_pending().take(id);
        let Some(record) = taken else {
            tracing::info!(
                mutation_id = %id,
                kind = kind.as_str(),
                succeeded = result.is_ok(),
                "Abandoned mutation resolved, cache left untouched"
            );
            return MutationOutcome::Abandoned {
                id,
                kind,
                error: result.err(),
            };
        };

        match result {
            Ok(()) => self.commit(record),
            Err(error) => self.roll_back(record, error),
        }
    }

    fn commit(&self, record: PendingMutation) -> MutationOutcome {
        let invalidated = self
            .cache
            .invalidate_many(self.policy.dependents(record.kind));
        tracing::info!(
            mutation_id = %record.id,
            kind = record.kind.as_str(),
            key = %record.key,
            invalidated = invalidated.len(),
            "Mutation committed"
        );
        MutationOutcome::Committed {
            id: record.id,
            kind: record.kind,
            invalidated,
        }
    }

    fn roll_back(&self, record: PendingMutation, error: ApiError) -> MutationOutcome {
        let restored = self.restore(&record);
        tracing::warn!(
            mutation_id = %record.id,
            kind = record.kind.as_str(),
            key = %record.key,
            restored,
            error = %error,
            "Mutation failed, optimistic change rolled back"
        );
        MutationOutcome::RolledBack {
            id: record.id,
            kind: record.kind,
            error,
            restored,
        }
    }

    /// Write the snapshot back over the optimistic value, unless the cache
    /// was cleared since the mutation started
    fn restore(&self, record: &PendingMutation) -> bool {
        match (&record.snapshot, record.wrote_optimistically()) {
            (Some(snapshot), true) => {
                self.cache
                    .write_in_epoch(record.key.clone(), snapshot.clone(), record.epoch)
            }
            _ => false,
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, PendingMutations> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Rolls back a mutation whose future is dropped while its remote call is
/// still in flight
struct DropGuard<'a> {
    mutator: &'a OptimisticMutator,
    id: Uuid,
    armed: bool,
}

impl DropGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for DropGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let taken = self.mutator.lock_pending().take(self.id);
        if let Some(record) = taken {
            let restored = self.mutator.restore(&record);
            tracing::warn!(
                mutation_id = %record.id,
                kind = record.kind.as_str(),
                key = %record.key,
                restored,
                "Mutation dropped before its remote call resolved"
            );
        }
    }
}
