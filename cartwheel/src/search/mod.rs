//! Shopping-search client and the backend seam.
//!
//! [`SerpClient`] talks to the hosted shopping-search service; the
//! [`ShoppingBackend`] trait is the seam the dispatcher and arbiter are
//! generic over, so tests and alternative backends can stand in for the
//! real service.

mod client;
mod config;
mod types;

pub use client::SerpClient;
pub use config::SerpConfig;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::product::SearchPage;

/// Maximum number of shopping results kept from a single response.
pub const MAX_RESULTS: usize = 10;

/// Operations the shopping-search service exposes.
///
/// All three can fail with [`Error::NoResults`](crate::Error::NoResults)
/// when the service answers with an explicit error field; that failure is
/// propagated, never retried here.
#[async_trait]
pub trait ShoppingBackend: Send + Sync {
    /// Run a fresh product search for `query`.
    async fn search(&self, query: &str) -> Result<SearchPage>;

    /// Resolve a service-provided filter link into a new result page.
    async fn resolve_filter_link(&self, link: &str) -> Result<SearchPage>;

    /// Resolve a service-provided product-details link into its raw payload.
    async fn resolve_detail_link(&self, link: &str) -> Result<Value>;
}
