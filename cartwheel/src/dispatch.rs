//! Concurrent fan-out of independent search requests.
//!
//! One agent turn can emit several search tool calls; the [`Dispatcher`]
//! runs the whole batch concurrently and joins on every outcome before
//! returning. Correctness is defined purely by correlation-id
//! correspondence. Completion order across requests is unspecified and
//! nothing downstream may rely on it.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use crate::error::Result;
use crate::product::SearchPage;
use crate::search::ShoppingBackend;

/// A unit of work for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Opaque key tracing the request back to the tool call that produced it.
    pub correlation_id: String,
    /// Free-text query to search for.
    pub query: String,
}

impl SearchRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(correlation_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            query: query.into(),
        }
    }
}

/// Executes batches of search requests concurrently.
#[derive(Debug, Clone)]
pub struct Dispatcher<S> {
    backend: Arc<S>,
}

impl<S: ShoppingBackend> Dispatcher<S> {
    /// Creates a dispatcher over the given backend.
    #[must_use]
    pub fn new(backend: Arc<S>) -> Self {
        Self { backend }
    }

    /// Execute every request in the batch concurrently and join on all of
    /// them.
    ///
    /// Each request's success or failure is independent: a failing request
    /// surfaces as an `Err` under its own correlation id and never blocks
    /// its siblings. The returned map holds exactly one outcome per input
    /// request. Parallelism within a batch is unbounded; batches are small,
    /// bounded by the number of tool calls in one agent turn.
    pub async fn dispatch_all(
        &self,
        requests: Vec<SearchRequest>,
    ) -> HashMap<String, Result<SearchPage>> {
        debug!(batch = requests.len(), "Dispatching search batch");

        let futs = requests.into_iter().map(|request| async move {
            let outcome = self.backend.search(&request.query).await;
            (request.correlation_id, outcome)
        });

        join_all(futs).await.into_iter().collect()
    }
}
