//! Remote calls whose completion order the test decides

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::ports::outbound::ApiError;

/// Hands out remote-call futures, each resolved later through `resolve`
/// by issue index, so tests can interleave two mutations deterministically.
#[derive(Default)]
pub struct GatedRemote {
    pending: Mutex<VecDeque<Option<oneshot::Sender<Result<(), ApiError>>>>>,
}

impl GatedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// A remote call that completes when the test resolves it
    pub fn call(&self) -> impl Future<Output = Result<(), ApiError>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().expect("pending").push_back(Some(tx));
        async move {
            rx.await
                .unwrap_or_else(|_| Err(ApiError::RequestFailed("call dropped".into())))
        }
    }

    /// Number of calls handed out so far
    pub fn issued(&self) -> usize {
        self.pending.lock().expect("pending").len()
    }

    /// Resolve the `index`-th call (0-based, in issue order)
    pub fn resolve(&self, index: usize, result: Result<(), ApiError>) {
        let sender = self
            .pending
            .lock()
            .expect("pending")
            .get_mut(index)
            .and_then(Option::take)
            .expect("call not issued or already resolved");
        let _ = sender.send(result);
    }
}
