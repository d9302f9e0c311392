//! Scriptable `QueryFetcher` that counts calls and can hold them back

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::ports::outbound::{ApiError, FetchError, QueryFetcher};
use crate::ports::{QueryData, QueryKey};

pub struct StubFetcher {
    responses: Mutex<HashMap<QueryKey, Result<QueryData, FetchError>>>,
    calls: Mutex<HashMap<QueryKey, usize>>,
    gate: Option<Semaphore>,
}

impl StubFetcher {
    /// Fetches resolve immediately
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            gate: None,
        }
    }

    /// Fetches wait until [`release`](Self::release) lets them through
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    /// Answer for every later fetch of `key`
    pub fn respond(&self, key: QueryKey, response: Result<QueryData, FetchError>) {
        self.responses.lock().expect("responses").insert(key, response);
    }

    /// Let `n` held fetches complete
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self, key: &QueryKey) -> usize {
        self.calls
            .lock()
            .expect("calls")
            .get(key)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl QueryFetcher for StubFetcher {
    async fn fetch(&self, key: &QueryKey) -> Result<QueryData, FetchError> {
        *self.calls.lock().expect("calls").entry(key.clone()).or_default() += 1;

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate open").forget();
        }

        self.responses
            .lock()
            .expect("responses")
            .get(key)
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError::Api(ApiError::http(
                    404,
                    format!("no stub for {key}"),
                )))
            })
    }
}
