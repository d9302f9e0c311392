//! Keyed query cache with stale-while-revalidate reads.
//!
//! Every entry holds the last value fetched or written for one [`QueryKey`].
//! Reads never block: they return what the entry holds right now and, when
//! the entry is missing, expired or invalidated, start one background fetch
//! for it. Concurrent reads of the same key share that fetch.
//!
//! Two counters per entry settle races with in-flight fetches:
//! - `write_seq` moves on every [`QueryCache::write`]. A fetch that started
//!   before a write is discarded when it completes.
//! - `invalidate_seq` moves on every invalidation. A fetch that started
//!   before an invalidation still stores its value, but the entry stays stale.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use super::retry::{retry_transient, RetryConfig};
use crate::ports::outbound::{FetchError, QueryFetcher};
use crate::ports::{QueryData, QueryFamily, QueryFilter, QueryKey};

/// Default freshness window for cached results
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a fetched or written value counts as fresh
    pub stale_time: Duration,
    /// Per-family overrides of `stale_time`
    pub family_stale_times: HashMap<QueryFamily, Duration>,
    /// Retry budget for background fetches
    pub retry: RetryConfig,
    /// Buffer size of the event channel
    pub event_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            family_stale_times: HashMap::from([(QueryFamily::PriorityList, Duration::ZERO)]),
            retry: RetryConfig::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// One freshness window for every family, no overrides
    pub fn uniform(stale_time: Duration) -> Self {
        Self {
            stale_time,
            family_stale_times: HashMap::new(),
            ..Self::default()
        }
    }

    pub fn with_family_stale_time(mut self, family: QueryFamily, stale_time: Duration) -> Self {
        self.family_stale_times.insert(family, stale_time);
        self
    }

    /// Freshness window applied to keys of `family`
    pub fn stale_time_for(&self, family: QueryFamily) -> Duration {
        self.family_stale_times
            .get(&family)
            .copied()
            .unwrap_or(self.stale_time)
    }
}

/// When `ensure` starts a fetch for an idle entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
    /// Missing, expired or invalidated entries. A failed entry is left alone.
    IfStale,
    /// Like `IfStale`, and a failed entry is fetched again
    IfStaleOrFailed,
    /// Only invalidated entries, or entries holding neither value nor error
    IfInvalidated,
}

/// What a view sees when it reads a key
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    /// Nothing cached yet; a fetch is on its way
    Loading,
    /// A value is cached
    Ready {
        data: QueryData,
        stale: bool,
        fetching: bool,
    },
    /// The last fetch failed. `previous` is the value held before the failure.
    Error {
        error: FetchError,
        previous: Option<QueryData>,
        fetching: bool,
    },
}

impl QueryState {
    pub fn data(&self) -> Option<&QueryData> {
        match self {
            QueryState::Ready { data, .. } => Some(data),
            QueryState::Error { previous, .. } => previous.as_ref(),
            QueryState::Loading => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            QueryState::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_fetching(&self) -> bool {
        match self {
            QueryState::Loading => true,
            QueryState::Ready { fetching, .. } | QueryState::Error { fetching, .. } => *fetching,
        }
    }

    /// No fetch is pending, so the state will not change on its own
    fn is_settled(&self) -> bool {
        !self.is_fetching()
    }
}

/// Change notifications, one per cache operation
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    /// The entry's value changed, by fetch or by write
    Updated(QueryKey),
    /// One invalidation pass marked these keys stale
    Invalidated(Vec<QueryKey>),
    /// A background fetch gave up
    FetchFailed { key: QueryKey, error: FetchError },
    /// Every entry was dropped
    Cleared,
}

#[derive(Debug, Default)]
struct CacheEntry {
    data: Option<QueryData>,
    error: Option<FetchError>,
    invalidated: bool,
    fetching: bool,
    updated_at: Option<Instant>,
    write_seq: u64,
    invalidate_seq: u64,
}

impl CacheEntry {
    fn is_stale(&self, stale_time: Duration) -> bool {
        self.invalidated
            || self
                .updated_at
                .map_or(true, |at| at.elapsed() >= stale_time)
    }

    fn needs_fetch(&self, stale_time: Duration, refresh: Refresh) -> bool {
        if self.fetching {
            return false;
        }
        if self.invalidated {
            return true;
        }
        match refresh {
            Refresh::IfInvalidated => self.data.is_none() && self.error.is_none(),
            Refresh::IfStaleOrFailed if self.error.is_some() => true,
            Refresh::IfStale | Refresh::IfStaleOrFailed => {
                self.error.is_none() && self.is_stale(stale_time)
            }
        }
    }

    fn state(&self, stale_time: Duration) -> QueryState {
        match (&self.error, &self.data) {
            (Some(error), previous) => QueryState::Error {
                error: error.clone(),
                previous: previous.clone(),
                fetching: self.fetching,
            },
            (None, Some(data)) => QueryState::Ready {
                data: data.clone(),
                stale: self.is_stale(stale_time),
                fetching: self.fetching,
            },
            (None, None) => QueryState::Loading,
        }
    }
}

/// Counters captured when a fetch starts
#[derive(Debug, Clone, Copy)]
struct FetchTicket {
    epoch: u64,
    write_seq: u64,
    invalidate_seq: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    /// Bumped by `clear`, so fetches started before it are ignored
    epoch: u64,
    disposed: bool,
}

struct CacheInner {
    state: RwLock<CacheState>,
    fetcher: Arc<dyn QueryFetcher>,
    config: CacheConfig,
    events: broadcast::Sender<CacheEvent>,
}

/// Shared handle to the query cache. Clones see the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new(fetcher: Arc<dyn QueryFetcher>, config: CacheConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(CacheInner {
                state: RwLock::new(CacheState::default()),
                fetcher,
                config,
                events,
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Current state of `key`, starting a background fetch when needed.
    ///
    /// Must be called from within a tokio runtime for the fetch to run.
    pub fn read(&self, key: &QueryKey) -> QueryState {
        self.ensure(key, Refresh::IfStale)
    }

    /// Fetch `key` if it is stale or failed, joining a fetch already in
    /// flight, and return the result once that fetch lands.
    ///
    /// The result is returned even when it is already stale again by then
    /// (a zero freshness window). Another round only starts when the entry
    /// was invalidated while the fetch was in flight.
    pub async fn fetch(&self, key: &QueryKey) -> Result<QueryData, FetchError> {
        let mut events = self.subscribe();
        let mut refresh = Refresh::IfStaleOrFailed;
        loop {
            let state = self.ensure(key, refresh);
            refresh = Refresh::IfInvalidated;
            if state.is_settled() {
                return match state {
                    QueryState::Ready { data, .. } => Ok(data),
                    QueryState::Error { error, .. } => Err(error),
                    QueryState::Loading => Err(FetchError::Disposed),
                };
            }

            loop {
                match events.recv().await {
                    Ok(CacheEvent::Updated(k)) | Ok(CacheEvent::FetchFailed { key: k, .. })
                        if &k == key =>
                    {
                        break
                    }
                    Ok(CacheEvent::Cleared) => break,
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(key = %key, skipped, "Cache event receiver lagged");
                        break;
                    }
                    Err(broadcast::error::RecvError::Closed) => return Err(FetchError::Disposed),
                }
            }
        }
    }

    /// Cached value without triggering a fetch
    pub fn peek(&self, key: &QueryKey) -> Option<QueryData> {
        self.read_state()
            .entries
            .get(key)
            .and_then(|entry| entry.data.clone())
    }

    /// Whether `key` is cached and stale; `None` when nothing is cached
    pub fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        let stale_time = self.stale_time_for(key);
        self.read_state()
            .entries
            .get(key)
            .filter(|entry| entry.data.is_some())
            .map(|entry| entry.is_stale(stale_time))
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.read_state()
            .entries
            .get(key)
            .is_some_and(|entry| entry.fetching)
    }

    /// Overwrite the entry for `key`. The value counts as fresh and any
    /// fetch already in flight for it is discarded.
    pub fn write(&self, key: QueryKey, value: QueryData) {
        self.store(key, value, None);
    }

    /// Number of times the cache has been cleared. Values read under one
    /// epoch must not be written back under another.
    pub fn epoch(&self) -> u64 {
        self.read_state().epoch
    }

    /// Write only if the cache has not been cleared since `epoch`
    pub(crate) fn write_in_epoch(&self, key: QueryKey, value: QueryData, epoch: u64) -> bool {
        self.store(key, value, Some(epoch))
    }

    fn store(&self, key: QueryKey, value: QueryData, expected_epoch: Option<u64>) -> bool {
        {
            let mut guard = self.write_state();
            if guard.disposed {
                tracing::warn!(key = %key, "Write to disposed cache ignored");
                return false;
            }
            if expected_epoch.is_some_and(|epoch| epoch != guard.epoch) {
                tracing::debug!(key = %key, "Cache cleared since value was read, write skipped");
                return false;
            }
            let entry = guard.entries.entry(key.clone()).or_default();
            entry.data = Some(value);
            entry.error = None;
            entry.invalidated = false;
            entry.updated_at = Some(Instant::now());
            entry.write_seq += 1;
        }
        tracing::debug!(key = %key, "Cache entry written");
        self.emit(CacheEvent::Updated(key));
        true
    }

    /// Mark every entry matching `filter` stale
    pub fn invalidate(&self, filter: impl Into<QueryFilter>) -> Vec<QueryKey> {
        self.invalidate_many(&[filter.into()])
    }

    /// Mark every entry matching any filter stale, as one pass with one event.
    ///
    /// Returns the keys that were marked.
    pub fn invalidate_many(&self, filters: &[QueryFilter]) -> Vec<QueryKey> {
        let keys: Vec<QueryKey> = {
            let mut guard = self.write_state();
            guard
                .entries
                .iter_mut()
                .filter(|(key, _)| filters.iter().any(|filter| filter.matches(key)))
                .map(|(key, entry)| {
                    entry.invalidated = true;
                    entry.invalidate_seq += 1;
                    key.clone()
                })
                .collect()
        };
        tracing::debug!(
            filters = filters.len(),
            invalidated = keys.len(),
            "Invalidated cached queries"
        );
        self.emit(CacheEvent::Invalidated(keys.clone()));
        keys
    }

    /// Invalidate one key and read it again, the manual retry for a failed view
    pub fn refetch(&self, key: &QueryKey) -> QueryState {
        self.invalidate(key.clone());
        self.read(key)
    }

    /// Drop every entry. Fetches already in flight are ignored when they land.
    pub fn clear(&self) {
        {
            let mut guard = self.write_state();
            guard.entries.clear();
            guard.epoch += 1;
        }
        tracing::debug!("Query cache cleared");
        self.emit(CacheEvent::Cleared);
    }

    /// Clear the cache and refuse further reads and writes
    pub fn dispose(&self) {
        self.write_state().disposed = true;
        self.clear();
        tracing::info!("Query cache disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.read_state().disposed
    }

    pub fn len(&self) -> usize {
        self.read_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().entries.is_empty()
    }

    fn stale_time_for(&self, key: &QueryKey) -> Duration {
        self.inner.config.stale_time_for(key.family())
    }

    fn ensure(&self, key: &QueryKey, refresh: Refresh) -> QueryState {
        let stale_time = self.stale_time_for(key);
        let (state, ticket) = {
            let mut guard = self.write_state();
            let cache = &mut *guard;
            if cache.disposed {
                return QueryState::Error {
                    error: FetchError::Disposed,
                    previous: None,
                    fetching: false,
                };
            }
            let epoch = cache.epoch;
            let entry = cache.entries.entry(key.clone()).or_default();
            let ticket = entry
                .needs_fetch(stale_time, refresh)
                .then(|| {
                    entry.fetching = true;
                    FetchTicket {
                        epoch,
                        write_seq: entry.write_seq,
                        invalidate_seq: entry.invalidate_seq,
                    }
                });
            (entry.state(stale_time), ticket)
        };

        if let Some(ticket) = ticket {
            self.spawn_fetch(key.clone(), ticket);
        }
        state
    }

    fn spawn_fetch(&self, key: QueryKey, ticket: FetchTicket) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(key = %key, "Starting background fetch");
                let cache = self.clone();
                handle.spawn(async move {
                    let result = cache.run_fetch(&key).await;
                    cache.complete_fetch(key, ticket, result);
                });
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "No runtime for background fetch");
                self.complete_fetch(key, ticket, Err(FetchError::Spawn(e.to_string())));
            }
        }
    }

    async fn run_fetch(&self, key: &QueryKey) -> Result<QueryData, FetchError> {
        let fetcher = Arc::clone(&self.inner.fetcher);
        let operation = key.to_string();
        let data = retry_transient(&self.inner.config.retry, &operation, || {
            let fetcher = Arc::clone(&fetcher);
            let key = key.clone();
            async move { fetcher.fetch(&key).await }
        })
        .await?;

        if !key.accepts(&data) {
            return Err(FetchError::UnexpectedPayload {
                key: key.clone(),
                actual: data.family(),
            });
        }
        Ok(data)
    }

    fn complete_fetch(
        &self,
        key: QueryKey,
        ticket: FetchTicket,
        result: Result<QueryData, FetchError>,
    ) {
        let event = {
            let mut guard = self.write_state();
            if guard.epoch != ticket.epoch {
                tracing::debug!(key = %key, "Fetch landed after clear, ignored");
                return;
            }
            let Some(entry) = guard.entries.get_mut(&key) else {
                return;
            };
            entry.fetching = false;

            if entry.write_seq != ticket.write_seq {
                tracing::debug!(key = %key, "Entry written during fetch, result discarded");
                CacheEvent::Updated(key)
            } else {
                let invalidated_in_flight = entry.invalidate_seq != ticket.invalidate_seq;
                entry.invalidated = invalidated_in_flight;
                match result {
                    Ok(data) => {
                        entry.data = Some(data);
                        entry.error = None;
                        entry.updated_at = Some(Instant::now());
                        tracing::debug!(
                            key = %key,
                            stale = invalidated_in_flight,
                            "Fetch stored"
                        );
                        CacheEvent::Updated(key)
                    }
                    Err(error) => {
                        tracing::warn!(key = %key, error = %error, "Fetch failed");
                        entry.error = Some(error.clone());
                        CacheEvent::FetchFailed { key, error }
                    }
                }
            }
        };
        self.emit(event);
    }

    fn emit(&self, event: CacheEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
