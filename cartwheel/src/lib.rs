//! Cartwheel: a conversational shopping assistant engine.
//!
//! Cartwheel drives a streamed run against a hosted reasoning assistant,
//! resolves the tool calls the assistant emits (product searches, filter
//! resolutions, and detail lookups) against a shopping-search service,
//! and feeds the results back until the run completes. Search calls within
//! one turn fan out concurrently; presentation layers subscribe to the
//! [`sink::EventSink`] callbacks for incremental text and product batches.

pub mod arbiter;
pub mod assistant;
pub mod dispatch;
pub mod error;
pub mod prelude;
pub mod product;
pub mod runner;
pub mod search;
pub mod sink;
pub mod tools;

pub use error::{Error, Result};
